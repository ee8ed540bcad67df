use rackwise_inventory::InventoryClient;
use rackwise_placement::{HostWeigher, RackDistributionWeigher};
use rackwise_state::StateStore;
use serde::Serialize;

use super::{RequestArgs, candidates};

#[derive(Debug, Serialize)]
pub struct WeighReport {
    pub hosts: Vec<String>,
    pub weights: Vec<f64>,
    pub min: f64,
    pub max: f64,
    pub normalized: Vec<f64>,
}

/// Weigh `host_ids` for one instance described by `request`.
pub fn weigh(
    store: &StateStore,
    inventory: &dyn InventoryClient,
    request: &RequestArgs,
    host_ids: &[String],
) -> anyhow::Result<WeighReport> {
    let hosts = candidates(inventory, host_ids)?;
    let outcome = RackDistributionWeigher::new(store).weigh(&hosts, &request.context())?;
    let normalized = outcome.normalized();

    Ok(WeighReport {
        hosts: hosts.into_iter().map(|h| h.host_id).collect(),
        weights: outcome.weights,
        min: outcome.min,
        max: outcome.max,
        normalized,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;

    fn request(workload_class: Option<&str>) -> RequestArgs {
        RequestArgs {
            project: "p1".to_string(),
            role: "web".to_string(),
            workload_class: workload_class.map(str::to_string),
            reservations: Vec::new(),
        }
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn weighs_by_rack_occupancy() {
        let store = testing::store();
        let report = weigh(&store, &store, &request(Some("bm.large")), &ids(&["n-a1", "n-b1", "n-c1"]))
            .unwrap();

        assert_eq!(report.hosts, ["n-a1", "n-b1", "n-c1"]);
        assert_eq!(report.weights, [0.0, 2.0, 2.0]);
        assert_eq!((report.min, report.max), (0.0, 2.0));
        assert_eq!(report.normalized, [0.0, 1.0, 1.0]);
    }

    #[test]
    fn reservations_shift_weights() {
        let store = testing::store();
        let mut req = request(Some("bm.large"));
        req.reservations.push(("n-b1".to_string(), "b".to_string()));

        let report = weigh(&store, &store, &req, &ids(&["n-a1", "n-b1", "n-c1"])).unwrap();
        assert_eq!(report.weights, [0.0, 1.0, 2.0]);
    }

    #[test]
    fn without_workload_class_every_host_weighs_the_same() {
        let store = testing::store();
        let report = weigh(&store, &store, &request(None), &ids(&["n-a1", "n-c1"])).unwrap();
        assert_eq!(report.weights, [1.0, 1.0]);
        assert_eq!(report.normalized, [0.0, 0.0]);
    }
}
