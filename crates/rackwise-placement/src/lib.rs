//! rackwise-placement: spread bare-metal instances of a role across racks.
//!
//! The weigher scores candidate hosts so that racks already running many
//! instances of the same (project, role) score lower; the final pick stays
//! with the scheduler. A multi-instance request threads a
//! [`BatchReservationSet`] through successive weighing calls so earlier
//! picks in the same pass count as occupancy, which is what
//! [`BatchPlacer`] does.
//!
//! # Components
//!
//! - **`weigher`**: `RackDistributionWeigher`, occupancy, reservations
//! - **`placer`**: `BatchPlacer` (weigh, pick, reserve, repeat)
//! - **`convert`**: hosts from node records, contexts from requests

pub mod convert;
pub mod error;
pub mod placer;
pub mod weigher;

pub use convert::{InstanceRequest, context_from_request, host_from_node, workload_class};
pub use error::{PlacementError, PlacementResult};
pub use placer::{BatchPlacer, Pick};
pub use weigher::{
    BatchReservationSet, HostCandidate, HostWeigher, InstanceInventory, RackDistributionWeigher,
    RackOccupancy, UniformWeigher, WeighContext, WeighOutcome,
};
