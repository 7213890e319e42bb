use crate::VehicleSet;

/// The state of a single vehicle at one time step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VehicleState {
    /// Forward distance from the reference origin, in cells.
    pub position: u32,
    /// Lane index, counted from zero.
    pub lane: u32,
    /// Cells advanced per time step.
    pub speed: u32,
}

impl VehicleState {
    /// Creates a vehicle state from a `[position, lane, speed]` record.
    pub const fn new(position: u32, lane: u32, speed: u32) -> Self {
        Self {
            position,
            lane,
            speed,
        }
    }
}

/// The complete simulation state at one time step.
///
/// Snapshots are immutable once produced; a state transition builds a new
/// snapshot rather than mutating the previous one.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// The time step the snapshot belongs to.
    pub time: u32,
    /// The emergency vehicles.
    pub emvs: VehicleSet,
    /// The ordinary vehicles.
    pub ovs: VehicleSet,
}
