//! Host weighing for bare-metal placement.
//!
//! The rack-distribution weigher favours racks with the fewest live
//! instances of the requesting (project, role):
//!
//! - **Occupancy**: live, non-errored instances of the role per rack, plus
//!   the picks already made earlier in the same scheduling pass
//! - **Score**: `max(occupancy) - occupancy[rack]`, so the emptiest racks
//!   score highest and the fullest score zero
//! - **Fallback**: requests that are not bare-metal workloads go to the
//!   default weigher untouched

use std::collections::{BTreeMap, HashMap};

use rackwise_core::{HostId, RackId};
use rackwise_state::{InstanceFilter, InstanceRecord, StateStore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlacementError, PlacementResult};

// ── Candidates ────────────────────────────────────────────────────

/// A host the scheduler is considering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostCandidate {
    pub host_id: HostId,
    /// Rack label; bare-metal hosts must have one to be weighed.
    pub rack: Option<RackId>,
    /// Free-form host stats reported by the inventory.
    #[serde(default)]
    pub stats: HashMap<String, String>,
}

impl HostCandidate {
    pub fn new(host_id: impl Into<String>) -> Self {
        Self {
            host_id: host_id.into(),
            rack: None,
            stats: HashMap::new(),
        }
    }

    pub fn with_rack(mut self, rack: impl Into<String>) -> Self {
        self.rack = Some(rack.into());
        self
    }

    /// Rack label, or `MissingRack` naming this host.
    pub fn require_rack(&self) -> PlacementResult<&str> {
        self.rack
            .as_deref()
            .ok_or_else(|| PlacementError::MissingRack {
                host_id: self.host_id.clone(),
            })
    }
}

// ── Reservations ──────────────────────────────────────────────────

/// Hosts provisionally picked earlier in the current multi-instance pass.
///
/// Owned by the caller for the duration of one scheduling pass. Weighers
/// only read it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReservationSet {
    hosts: BTreeMap<HostId, RackId>,
}

impl BatchReservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `host` was picked. Fails if it has no rack.
    pub fn consume(&mut self, host: &HostCandidate) -> PlacementResult<()> {
        let rack = host.require_rack()?.to_string();
        debug!(host = %host.host_id, %rack, "host reserved");
        self.hosts.insert(host.host_id.clone(), rack);
        Ok(())
    }

    pub fn reserve(&mut self, host_id: impl Into<String>, rack: impl Into<String>) {
        self.hosts.insert(host_id.into(), rack.into());
    }

    pub fn contains(&self, host_id: &str) -> bool {
        self.hosts.contains_key(host_id)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Rack of each reserved host; a rack repeats once per host.
    pub fn racks(&self) -> impl Iterator<Item = &str> {
        self.hosts.values().map(String::as_str)
    }
}

// ── Occupancy ─────────────────────────────────────────────────────

/// Instance count per rack for one (project, role).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RackOccupancy {
    counts: BTreeMap<RackId, u32>,
}

impl RackOccupancy {
    /// Count instances of `role` per rack.
    ///
    /// Errored instances and instances without a rack are ignored.
    pub fn from_instances(instances: &[InstanceRecord], role: &str) -> Self {
        let mut occupancy = Self::default();
        for instance in instances {
            if instance.vm_state.is_error() || instance.role() != Some(role) {
                continue;
            }
            if let Some(rack) = instance.rack() {
                occupancy.add(rack);
            }
        }
        occupancy
    }

    pub fn add(&mut self, rack: &str) {
        *self.counts.entry(rack.to_string()).or_insert(0) += 1;
    }

    pub fn add_reservations(&mut self, reservations: &BatchReservationSet) {
        for rack in reservations.racks() {
            self.add(rack);
        }
    }

    /// Count for `rack`; zero for racks never seen.
    pub fn get(&self, rack: &str) -> u32 {
        self.counts.get(rack).copied().unwrap_or(0)
    }

    /// Highest count, or 1 when nothing is placed anywhere.
    pub fn max(&self) -> u32 {
        self.counts.values().copied().max().unwrap_or(1)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(rack, count)| (rack.as_str(), *count))
    }
}

// ── Context and outcome ───────────────────────────────────────────

/// What is being scheduled, as seen by a weigher.
#[derive(Debug, Clone, PartialEq)]
pub struct WeighContext {
    pub project_id: String,
    pub role: String,
    /// Present only for bare-metal workloads.
    pub workload_class: Option<String>,
    pub reservations: BatchReservationSet,
}

impl WeighContext {
    pub fn new(project_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            role: role.into(),
            workload_class: None,
            reservations: BatchReservationSet::new(),
        }
    }

    pub fn with_workload_class(mut self, class: impl Into<String>) -> Self {
        self.workload_class = Some(class.into());
        self
    }

    pub fn is_bare_metal(&self) -> bool {
        self.workload_class.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// Weights for one call, in host input order, with their range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeighOutcome {
    pub weights: Vec<f64>,
    pub min: f64,
    pub max: f64,
}

impl WeighOutcome {
    /// Wrap raw weights. `min` and `max` are 0 when there are none.
    pub fn from_weights(weights: Vec<f64>) -> Self {
        let (min, max) = weights
            .iter()
            .fold(None, |range: Option<(f64, f64)>, &w| match range {
                None => Some((w, w)),
                Some((lo, hi)) => Some((lo.min(w), hi.max(w))),
            })
            .unwrap_or((0.0, 0.0));
        Self { weights, min, max }
    }

    /// Weights rescaled to `0.0..=1.0`; all zero when every weight is equal.
    pub fn normalized(&self) -> Vec<f64> {
        let range = self.max - self.min;
        if range == 0.0 {
            return vec![0.0; self.weights.len()];
        }
        self.weights.iter().map(|w| (w - self.min) / range).collect()
    }
}

// ── Seams ─────────────────────────────────────────────────────────

/// Read access to compute instance records.
pub trait InstanceInventory {
    fn list_instances(&self, filter: &InstanceFilter) -> PlacementResult<Vec<InstanceRecord>>;
}

impl InstanceInventory for StateStore {
    fn list_instances(&self, filter: &InstanceFilter) -> PlacementResult<Vec<InstanceRecord>> {
        Ok(StateStore::list_instances(self, filter)?)
    }
}

impl<I: InstanceInventory + ?Sized> InstanceInventory for &I {
    fn list_instances(&self, filter: &InstanceFilter) -> PlacementResult<Vec<InstanceRecord>> {
        (**self).list_instances(filter)
    }
}

/// Scores candidate hosts. Higher is better.
pub trait HostWeigher {
    fn weigh(&self, hosts: &[HostCandidate], ctx: &WeighContext) -> PlacementResult<WeighOutcome>;
}

/// Scores every host `1.0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformWeigher;

impl HostWeigher for UniformWeigher {
    fn weigh(&self, hosts: &[HostCandidate], _ctx: &WeighContext) -> PlacementResult<WeighOutcome> {
        Ok(WeighOutcome::from_weights(vec![1.0; hosts.len()]))
    }
}

// ── Rack distribution ─────────────────────────────────────────────

/// Spreads instances of a role across racks.
///
/// Holds no per-call state: min/max are returned in each [`WeighOutcome`],
/// and the one inventory read per call is not cached or retried.
#[derive(Debug, Clone)]
pub struct RackDistributionWeigher<I, D = UniformWeigher> {
    inventory: I,
    default: D,
}

impl<I: InstanceInventory> RackDistributionWeigher<I> {
    pub fn new(inventory: I) -> Self {
        Self {
            inventory,
            default: UniformWeigher,
        }
    }
}

impl<I: InstanceInventory, D: HostWeigher> RackDistributionWeigher<I, D> {
    pub fn with_default(inventory: I, default: D) -> Self {
        Self { inventory, default }
    }

    /// Occupancy of the context's (project, role), reservations included.
    pub fn occupancy(&self, ctx: &WeighContext) -> PlacementResult<RackOccupancy> {
        let instances = self
            .inventory
            .list_instances(&InstanceFilter::live(ctx.project_id.as_str()))?;
        let mut occupancy = RackOccupancy::from_instances(&instances, &ctx.role);
        occupancy.add_reservations(&ctx.reservations);
        debug!(
            project = %ctx.project_id,
            role = %ctx.role,
            instances = instances.len(),
            reserved = ctx.reservations.len(),
            racks = ?occupancy.counts,
            "rack occupancy"
        );
        Ok(occupancy)
    }
}

impl<I: InstanceInventory, D: HostWeigher> HostWeigher for RackDistributionWeigher<I, D> {
    fn weigh(&self, hosts: &[HostCandidate], ctx: &WeighContext) -> PlacementResult<WeighOutcome> {
        if !ctx.is_bare_metal() {
            return self.default.weigh(hosts, ctx);
        }

        let occupancy = self.occupancy(ctx)?;
        let max = occupancy.max();
        let weights = hosts
            .iter()
            .map(|host| -> PlacementResult<f64> {
                let rack = host.require_rack()?;
                Ok(f64::from(max) - f64::from(occupancy.get(rack)))
            })
            .collect::<PlacementResult<Vec<f64>>>()?;

        let outcome = WeighOutcome::from_weights(weights);
        debug!(
            role = %ctx.role,
            weights = ?outcome.weights,
            min = outcome.min,
            max = outcome.max,
            "weigher returning weights"
        );
        Ok(outcome)
    }
}
