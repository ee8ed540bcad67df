//! Logical network → physical address resolution.

use rackwise_core::NetworkTagMap;
use tracing::debug;

use crate::error::{TopologyError, TopologyResult};
use crate::types::NodeTopology;

/// Resolves which physical port a node should use for a logical network.
///
/// Holds only a borrowed tag map, so one resolver can serve any number of
/// concurrent requests.
#[derive(Debug, Clone, Copy)]
pub struct TopologyResolver<'a> {
    tags: &'a NetworkTagMap,
}

impl<'a> TopologyResolver<'a> {
    pub fn new(tags: &'a NetworkTagMap) -> Self {
        Self { tags }
    }

    /// Address of the first group (in declaration order) whose VLAN tag
    /// maps to a substring of `network`.
    ///
    /// Groups without a VLAN tag are skipped. A tag with no entry in the
    /// tag map is a configuration error, not a non-match.
    pub fn resolve<'t>(&self, topology: &'t NodeTopology, network: &str) -> TopologyResult<&'t str> {
        for group in topology.groups() {
            let Some(tag) = group.vlan.as_deref() else {
                continue;
            };
            let mapped = self
                .tags
                .lookup(tag)
                .ok_or_else(|| TopologyError::UnmappedVlanTag {
                    node_id: topology.node_id().to_string(),
                    group: group.name.clone(),
                    tag: tag.to_string(),
                })?;
            if network.contains(mapped) {
                let address = topology.address_for(group)?;
                debug!(
                    node = %topology.node_id(),
                    %network,
                    group = %group.name,
                    vlan = %tag,
                    %address,
                    "resolved network address"
                );
                return Ok(address);
            }
        }

        Err(TopologyError::NoMatchingGroup {
            node_id: topology.node_id().to_string(),
            network: network.to_string(),
        })
    }

    /// Whether `address` is one of the node's physical port addresses.
    pub fn contains(&self, topology: &NodeTopology, address: &str) -> bool {
        topology.contains(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InterfaceGroup, InterfaceKind};
    use rackwise_core::ErrorKind;
    use std::collections::BTreeMap;

    const EM1: &str = "aa:00:00:00:00:01";
    const P1P1: &str = "aa:00:00:00:00:02";
    const P2P1: &str = "aa:00:00:00:00:03";

    fn ports() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("em1".to_string(), EM1.to_string()),
            ("p1p1".to_string(), P1P1.to_string()),
            ("p2p1".to_string(), P2P1.to_string()),
        ])
    }

    /// bond0 over p1p1/p2p1, mgmt on em1 (101), data and prod tagged on bond0.
    fn standard_topology() -> NodeTopology {
        NodeTopology::new(
            "node-1",
            vec![
                InterfaceGroup::new("bond0", InterfaceKind::Bonded, &["p1p1", "p2p1"]),
                InterfaceGroup::new("mgmt", InterfaceKind::Aliased, &["em1"]).with_vlan(101),
                InterfaceGroup::new("bond0.102", InterfaceKind::Tagged, &["bond0"]).with_vlan(102),
                InterfaceGroup::new("bond0.103", InterfaceKind::Tagged, &["bond0"]).with_vlan(103),
            ],
            ports(),
        )
        .unwrap()
    }

    #[test]
    fn aliased_group_resolves_to_its_port() {
        let tags = NetworkTagMap::default();
        let topology = standard_topology();
        let resolver = TopologyResolver::new(&tags);

        assert_eq!(resolver.resolve(&topology, "mgmt").unwrap(), EM1);
    }

    #[test]
    fn tagged_group_resolves_through_carrier() {
        let tags = NetworkTagMap::default();
        let topology = standard_topology();
        let resolver = TopologyResolver::new(&tags);

        // bond0.103 → bond0 → p1p1, never the tagged group itself.
        assert_eq!(resolver.resolve(&topology, "prod").unwrap(), P1P1);
        assert_eq!(resolver.resolve(&topology, "data").unwrap(), P1P1);
    }

    #[test]
    fn network_name_matches_by_substring() {
        let tags = NetworkTagMap::default();
        let topology = standard_topology();
        let resolver = TopologyResolver::new(&tags);

        assert_eq!(resolver.resolve(&topology, "prod-east").unwrap(), P1P1);
        assert_eq!(resolver.resolve(&topology, "cpe-mgmt").unwrap(), EM1);
    }

    #[test]
    fn substring_match_is_case_sensitive() {
        let tags = NetworkTagMap::default();
        let topology = standard_topology();
        let resolver = TopologyResolver::new(&tags);

        let err = resolver.resolve(&topology, "PROD").unwrap_err();
        assert!(matches!(err, TopologyError::NoMatchingGroup { .. }));
    }

    #[test]
    fn first_declared_group_wins() {
        let tags: NetworkTagMap = [("101", "mgmt"), ("201", "mgmt")].into_iter().collect();
        let topology = NodeTopology::new(
            "node-1",
            vec![
                InterfaceGroup::new("alt", InterfaceKind::Aliased, &["p2p1"]).with_vlan(201),
                InterfaceGroup::new("mgmt", InterfaceKind::Aliased, &["em1"]).with_vlan(101),
            ],
            ports(),
        )
        .unwrap();

        let resolver = TopologyResolver::new(&tags);
        assert_eq!(resolver.resolve(&topology, "mgmt").unwrap(), P2P1);
    }

    #[test]
    fn resolution_is_deterministic() {
        let tags = NetworkTagMap::default();
        let topology = standard_topology();
        let resolver = TopologyResolver::new(&tags);

        let first = resolver.resolve(&topology, "prod").unwrap();
        let second = resolver.resolve(&topology, "prod").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unmatched_network_is_not_found() {
        let tags = NetworkTagMap::default();
        let topology = standard_topology();
        let resolver = TopologyResolver::new(&tags);

        let err = resolver.resolve(&topology, "storage").unwrap_err();
        assert_eq!(
            err,
            TopologyError::NoMatchingGroup {
                node_id: "node-1".to_string(),
                network: "storage".to_string(),
            }
        );
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn empty_topology_is_not_found() {
        let tags = NetworkTagMap::default();
        let topology = NodeTopology::new("node-1", Vec::new(), ports()).unwrap();
        let resolver = TopologyResolver::new(&tags);

        assert_eq!(
            resolver.resolve(&topology, "mgmt").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn unmapped_tag_fails_fast() {
        let tags: NetworkTagMap = [("101", "mgmt")].into_iter().collect();
        let topology = NodeTopology::new(
            "node-1",
            vec![
                InterfaceGroup::new("bond0", InterfaceKind::Bonded, &["p1p1"]).with_vlan(999),
                InterfaceGroup::new("mgmt", InterfaceKind::Aliased, &["em1"]).with_vlan(101),
            ],
            ports(),
        )
        .unwrap();
        let resolver = TopologyResolver::new(&tags);

        let err = resolver.resolve(&topology, "mgmt").unwrap_err();
        assert_eq!(
            err,
            TopologyError::UnmappedVlanTag {
                node_id: "node-1".to_string(),
                group: "bond0".to_string(),
                tag: "999".to_string(),
            }
        );
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn untagged_groups_are_skipped() {
        let tags = NetworkTagMap::default();
        let topology = NodeTopology::new(
            "node-1",
            vec![InterfaceGroup::new("bond0", InterfaceKind::Bonded, &["p1p1", "p2p1"])],
            ports(),
        )
        .unwrap();
        let resolver = TopologyResolver::new(&tags);

        assert!(resolver.resolve(&topology, "prod").is_err());
    }

    #[test]
    fn contains_reports_physical_addresses() {
        let tags = NetworkTagMap::default();
        let topology = standard_topology();
        let resolver = TopologyResolver::new(&tags);

        assert!(resolver.contains(&topology, P2P1));
        assert!(!resolver.contains(&topology, "de:ad:be:ef:00:00"));
    }
}
