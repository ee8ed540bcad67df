//! Batch placement: one bare-metal instance per host, spread by weight.
//!
//! For a request of `count` instances the placer repeats:
//! 1. Weigh the remaining candidates (reservations included)
//! 2. Pick the highest weight, first in input order on ties
//! 3. Reserve the pick and drop it from the candidates

use rackwise_core::{HostId, RackId};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{PlacementError, PlacementResult};
use crate::weigher::{HostCandidate, HostWeigher, WeighContext};

/// One placement decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pick {
    pub host_id: HostId,
    pub rack: Option<RackId>,
    /// Weight of the host when it was picked.
    pub weight: f64,
}

/// Drives a weigher through a multi-instance scheduling pass.
#[derive(Debug, Clone)]
pub struct BatchPlacer<W> {
    weigher: W,
}

impl<W: HostWeigher> BatchPlacer<W> {
    pub fn new(weigher: W) -> Self {
        Self { weigher }
    }

    pub fn weigher(&self) -> &W {
        &self.weigher
    }

    /// Pick up to `count` distinct hosts.
    ///
    /// Every pick is recorded in `ctx.reservations`, so the caller can
    /// carry the same context into a later pass. Hosts already reserved
    /// there are never picked again. Returns fewer picks than requested
    /// when candidates run out.
    pub fn place(
        &self,
        hosts: &[HostCandidate],
        ctx: &mut WeighContext,
        count: usize,
    ) -> PlacementResult<Vec<Pick>> {
        let mut remaining: Vec<HostCandidate> = hosts
            .iter()
            .filter(|h| !ctx.reservations.contains(&h.host_id))
            .cloned()
            .collect();
        let mut picks = Vec::with_capacity(count.min(remaining.len()));

        while picks.len() < count && !remaining.is_empty() {
            let outcome = self.weigher.weigh(&remaining, ctx)?;
            if outcome.weights.len() != remaining.len() {
                return Err(PlacementError::WeightCount {
                    expected: remaining.len(),
                    got: outcome.weights.len(),
                });
            }
            let Some(best) = best_index(&outcome.weights) else {
                break;
            };
            let host = remaining.remove(best);
            ctx.reservations.consume(&host)?;
            debug!(
                host = %host.host_id,
                rack = ?host.rack,
                weight = outcome.weights[best],
                "host picked"
            );
            picks.push(Pick {
                host_id: host.host_id,
                rack: host.rack,
                weight: outcome.weights[best],
            });
        }

        if picks.len() < count {
            warn!(
                project = %ctx.project_id,
                role = %ctx.role,
                requested = count,
                placed = picks.len(),
                "could not place all instances: not enough candidate hosts"
            );
        } else {
            info!(
                project = %ctx.project_id,
                role = %ctx.role,
                placed = picks.len(),
                "batch placed"
            );
        }

        Ok(picks)
    }
}

/// Index of the highest weight; the earliest wins ties.
fn best_index(weights: &[f64]) -> Option<usize> {
    weights
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &w)| match best {
            Some((_, top)) if w <= top => best,
            _ => Some((i, w)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weigher::{
        InstanceInventory, RackDistributionWeigher, UniformWeigher, WeighOutcome,
    };
    use rackwise_core::ErrorKind;
    use rackwise_state::{InstanceFilter, InstanceRecord, VmState};
    use std::collections::HashMap;

    struct Existing(Vec<InstanceRecord>);

    impl InstanceInventory for Existing {
        fn list_instances(&self, filter: &InstanceFilter) -> PlacementResult<Vec<InstanceRecord>> {
            Ok(self.0.iter().filter(|i| filter.matches(i)).cloned().collect())
        }
    }

    fn web(uuid: &str, rack: &str) -> InstanceRecord {
        InstanceRecord {
            uuid: uuid.to_string(),
            project_id: "p1".to_string(),
            hostname: format!("{uuid}-prod"),
            node_uuid: None,
            vm_state: VmState::Active,
            deleted: false,
            metadata: HashMap::from([
                ("role".to_string(), "web".to_string()),
                ("rack".to_string(), rack.to_string()),
            ]),
        }
    }

    fn racked(pairs: &[(&str, &str)]) -> Vec<HostCandidate> {
        pairs
            .iter()
            .map(|(id, rack)| HostCandidate::new(*id).with_rack(*rack))
            .collect()
    }

    fn bare_metal() -> WeighContext {
        WeighContext::new("p1", "web").with_workload_class("bm.large")
    }

    #[test]
    fn best_index_prefers_first_on_ties() {
        assert_eq!(best_index(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(best_index(&[0.0, 0.0]), Some(0));
        assert_eq!(best_index(&[]), None);
    }

    #[test]
    fn batch_spreads_across_racks() {
        let hosts = racked(&[("a1", "A"), ("a2", "A"), ("b1", "B"), ("b2", "B"), ("c1", "C")]);
        let placer = BatchPlacer::new(RackDistributionWeigher::new(Existing(Vec::new())));
        let mut ctx = bare_metal();

        let picks = placer.place(&hosts, &mut ctx, 3).unwrap();

        let racks: Vec<&str> = picks.iter().filter_map(|p| p.rack.as_deref()).collect();
        assert_eq!(racks, ["A", "B", "C"]);
        assert_eq!(ctx.reservations.len(), 3);
    }

    #[test]
    fn batch_avoids_already_occupied_rack() {
        let hosts = racked(&[("a1", "A"), ("b1", "B"), ("c1", "C")]);
        let inventory = Existing(vec![web("i-1", "A"), web("i-2", "A")]);
        let placer = BatchPlacer::new(RackDistributionWeigher::new(inventory));
        let mut ctx = bare_metal();

        let picks = placer.place(&hosts, &mut ctx, 2).unwrap();

        let ids: Vec<&str> = picks.iter().map(|p| p.host_id.as_str()).collect();
        assert_eq!(ids, ["b1", "c1"]);
    }

    #[test]
    fn each_host_is_picked_once() {
        let hosts = racked(&[("a1", "A"), ("b1", "B")]);
        let placer = BatchPlacer::new(UniformWeigher);
        let mut ctx = bare_metal();

        let picks = placer.place(&hosts, &mut ctx, 5).unwrap();

        let ids: Vec<&str> = picks.iter().map(|p| p.host_id.as_str()).collect();
        assert_eq!(ids, ["a1", "b1"]);
    }

    #[test]
    fn reserved_hosts_are_not_picked_again() {
        let hosts = racked(&[("b1", "B"), ("c1", "C")]);
        let placer = BatchPlacer::new(RackDistributionWeigher::new(Existing(Vec::new())));
        let mut ctx = bare_metal();
        ctx.reservations.reserve("b1", "B");

        let picks = placer.place(&hosts, &mut ctx, 2).unwrap();

        let ids: Vec<&str> = picks.iter().map(|p| p.host_id.as_str()).collect();
        assert_eq!(ids, ["c1"]);
        assert_eq!(ctx.reservations.len(), 2);
    }

    #[test]
    fn second_pass_continues_from_first() {
        let hosts = racked(&[("a1", "A"), ("a2", "A"), ("b1", "B")]);
        let placer = BatchPlacer::new(RackDistributionWeigher::new(Existing(Vec::new())));
        let mut ctx = bare_metal();

        let first = placer.place(&hosts, &mut ctx, 2).unwrap();
        let second = placer.place(&hosts, &mut ctx, 2).unwrap();

        let ids: Vec<&str> = first
            .iter()
            .chain(&second)
            .map(|p| p.host_id.as_str())
            .collect();
        assert_eq!(ids, ["a1", "b1", "a2"]);
    }

    struct Overcounting;

    impl HostWeigher for Overcounting {
        fn weigh(
            &self,
            hosts: &[HostCandidate],
            _ctx: &WeighContext,
        ) -> PlacementResult<WeighOutcome> {
            Ok(WeighOutcome::from_weights(vec![1.0; hosts.len() + 1]))
        }
    }

    #[test]
    fn mismatched_weight_count_fails() {
        let hosts = racked(&[("a1", "A")]);
        let placer = BatchPlacer::new(Overcounting);
        let mut ctx = bare_metal();

        let err = placer.place(&hosts, &mut ctx, 1).unwrap_err();
        assert!(matches!(err, PlacementError::WeightCount { expected: 1, got: 2 }));
        assert!(ctx.reservations.is_empty());
    }

    #[test]
    fn zero_count_places_nothing() {
        let hosts = racked(&[("a1", "A")]);
        let placer = BatchPlacer::new(UniformWeigher);
        let mut ctx = bare_metal();

        assert!(placer.place(&hosts, &mut ctx, 0).unwrap().is_empty());
        assert!(ctx.reservations.is_empty());
    }

    #[test]
    fn unracked_pick_fails() {
        let hosts = vec![HostCandidate::new("vm-1")];
        let placer = BatchPlacer::new(UniformWeigher);
        let mut ctx = WeighContext::new("p1", "web");

        let err = placer.place(&hosts, &mut ctx, 1).unwrap_err();
        assert!(matches!(err, PlacementError::MissingRack { .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
