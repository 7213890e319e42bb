//! Occupancy-grid construction and cell-conflict resolution.

use crate::{ScenarioConfig, Snapshot, VehicleId, VehicleSet};
use itertools::Itertools;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// The occupancy code of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum CellCode {
    /// Nothing occupies the cell.
    Empty = 0,
    /// Exactly one OV occupies the cell.
    Ov = 1,
    /// Exactly one EMV occupies the cell.
    Emv = 2,
    /// Two or more vehicles share the cell.
    Conflict = 3,
}

/// A dense cell-code matrix of shape `(cells_per_lane, lanes)`.
///
/// Storage is indexed from the far end of the roadway: position 0, lane 0 is
/// the far corner, and larger coordinates approach the opposite corner. The
/// rendered geometry relies on this orientation.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    cells: Vec<CellCode>,
    rows: usize,
    lanes: usize,
}

impl OccupancyGrid {
    /// Creates an empty grid with `rows` cells per lane and `lanes` lanes.
    pub fn new(rows: usize, lanes: usize) -> Self {
        Self {
            cells: vec![CellCode::Empty; rows * lanes],
            rows,
            lanes,
        }
    }

    /// Number of cells per lane.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of lanes.
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// The code stored at the given storage coordinates.
    pub fn code_at(&self, row: usize, col: usize) -> CellCode {
        self.cells[row * self.lanes + col]
    }

    /// The code of the cell a vehicle at `(position, lane)` occupies.
    ///
    /// Coordinates outside the grid make the index fall off the cell array
    /// and panic; the grid never wraps or clamps them.
    pub fn get(&self, position: u32, lane: u32) -> CellCode {
        self.cells[self.index(position, lane)]
    }

    /// Storage coordinates of the cell a vehicle at `(position, lane)`
    /// occupies.
    pub fn locate(&self, position: u32, lane: u32) -> (usize, usize) {
        let idx = self.index(position, lane);
        (idx / self.lanes, idx % self.lanes)
    }

    fn set(&mut self, position: u32, lane: u32, code: CellCode) {
        let idx = self.index(position, lane);
        self.cells[idx] = code;
    }

    /// Maps roadway coordinates to a storage index, mirroring both axes
    /// from the far end.
    fn index(&self, position: u32, lane: u32) -> usize {
        let row = mirror(self.rows, position as usize);
        let col = mirror(self.lanes, lane as usize);
        row * self.lanes + col
    }
}

/// Mirrors a coordinate from the far end of an axis: 0 stays 0, larger
/// values count down from `extent`. Out-of-range coordinates wrap to
/// indices no cell array can hold.
fn mirror(extent: usize, coord: usize) -> usize {
    if coord == 0 {
        0
    } else {
        extent.wrapping_sub(coord)
    }
}

/// The annotation for one occupied cell: every occupant's display label,
/// joined with `/` and EMVs listed first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellLabel {
    /// Forward cell coordinate of the labelled cell.
    pub position: u32,
    /// Lane coordinate of the labelled cell.
    pub lane: u32,
    /// The joined occupant labels.
    pub text: String,
}

/// Everything the renderer needs to draw one time step.
#[derive(Clone, Debug)]
pub struct Frame {
    /// The time step the frame depicts.
    pub time: u32,
    /// The colored occupancy grid.
    pub grid: OccupancyGrid,
    /// Per-cell occupant annotations.
    pub labels: Vec<CellLabel>,
}

/// Builds occupancy grids from vehicle snapshots, flagging cells shared by
/// more than one vehicle.
pub struct ConflictResolver {
    cells_per_lane: usize,
    lanes: usize,
}

impl ConflictResolver {
    /// Creates a resolver for the scenario's grid dimensions.
    pub fn new(config: &ScenarioConfig) -> Self {
        Self {
            cells_per_lane: config.cells_per_lane as usize,
            lanes: config.lanes as usize,
        }
    }

    /// Colors a grid from the given vehicle sets and collects the per-cell
    /// occupant labels.
    ///
    /// EMVs are painted first, in ID order, then OVs: a second EMV turns an
    /// EMV cell into a conflict, and an OV turns any occupied cell into a
    /// conflict. The pass order is part of the coloring contract and must
    /// not be swapped.
    pub fn resolve(&self, emvs: &VehicleSet, ovs: &VehicleSet) -> (OccupancyGrid, Vec<CellLabel>) {
        let mut grid = OccupancyGrid::new(self.cells_per_lane, self.lanes);
        let mut occupants: BTreeMap<(u32, u32), SmallVec<[String; 2]>> = BTreeMap::new();

        for (&id, state) in emvs {
            occupants
                .entry((state.position, state.lane))
                .or_default()
                .push(emv_label(id));
            let code = match grid.get(state.position, state.lane) {
                CellCode::Empty => CellCode::Emv,
                CellCode::Emv => CellCode::Conflict,
                code => code,
            };
            grid.set(state.position, state.lane, code);
        }

        for (&id, state) in ovs {
            occupants
                .entry((state.position, state.lane))
                .or_default()
                .push(id.to_string());
            let code = match grid.get(state.position, state.lane) {
                CellCode::Empty => CellCode::Ov,
                CellCode::Ov | CellCode::Emv => CellCode::Conflict,
                code => code,
            };
            grid.set(state.position, state.lane, code);
        }

        let labels = occupants
            .into_iter()
            .map(|((position, lane), names)| CellLabel {
                position,
                lane,
                text: names.iter().join("/"),
            })
            .collect();

        (grid, labels)
    }

    /// Builds the full renderer contract for one snapshot.
    pub fn frame(&self, snapshot: &Snapshot) -> Frame {
        let (grid, labels) = self.resolve(&snapshot.emvs, &snapshot.ovs);
        Frame {
            time: snapshot.time,
            grid,
            labels,
        }
    }
}

/// EMV display label: ID 1 is `a`, ID 2 is `b`, and so on.
fn emv_label(id: VehicleId) -> String {
    char::from(b'a' + (id as u8 - 1)).to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn indexes_from_the_far_corner() {
        let mut grid = OccupancyGrid::new(5, 3);
        grid.set(0, 0, CellCode::Emv);
        assert_eq!(grid.code_at(0, 0), CellCode::Emv);
        assert_eq!(grid.locate(0, 0), (0, 0));
    }

    #[test]
    fn larger_coordinates_approach_the_opposite_corner() {
        let mut grid = OccupancyGrid::new(5, 3);
        grid.set(2, 1, CellCode::Ov);
        assert_eq!(grid.code_at(3, 2), CellCode::Ov);
        assert_eq!(grid.locate(2, 1), (3, 2));
        assert_eq!(grid.locate(1, 2), (4, 1));
    }

    #[test]
    #[should_panic]
    fn positions_off_the_grid_are_fatal() {
        let grid = OccupancyGrid::new(5, 3);
        grid.get(6, 0);
    }

    #[test]
    fn emv_labels_are_letters() {
        assert_eq!(emv_label(1), "a");
        assert_eq!(emv_label(2), "b");
        assert_eq!(emv_label(26), "z");
    }
}
