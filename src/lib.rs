pub use conflict::{CellCode, CellLabel, ConflictResolver, Frame, OccupancyGrid};
pub use render::{ColorMap, GridRenderer};
pub use scenario::ScenarioConfig;
pub use simulation::GreedySimulator;
pub use snapshot::{Snapshot, VehicleState};
pub use trajectory::{ChangeEvent, ChangeLog, ClassChanges, ExactReplay};

mod conflict;
mod render;
mod scenario;
mod simulation;
mod snapshot;
mod trajectory;

/// Unique ID of a vehicle within its class.
///
/// IDs are 1-based and follow scenario declaration order; they are never
/// reused or renumbered across time steps.
pub type VehicleId = u32;

/// The vehicles of one class, iterated in ID order.
pub type VehicleSet = std::collections::BTreeMap<VehicleId, VehicleState>;
