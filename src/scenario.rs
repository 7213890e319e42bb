//! Scenario configuration loading.

use crate::{VehicleSet, VehicleState};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// An immutable scenario record, as read from a dataset JSON file.
///
/// Field names mirror the keys of the on-disk format. The core model only
/// consumes the grid dimensions, the nominal speed and the two initial-state
/// lists; the remaining fields are carried for collaborators such as the
/// renderer (`A`/`B` cell aspect) and the exact-trajectory replay.
#[derive(Clone, Debug, Deserialize)]
pub struct ScenarioConfig {
    /// Simulation horizon in time steps.
    #[serde(rename = "T")]
    pub horizon: u32,
    /// Number of cells per lane.
    #[serde(rename = "I")]
    pub cells_per_lane: u32,
    /// Number of lanes.
    #[serde(rename = "L")]
    pub lanes: u32,
    /// Number of emergency vehicles.
    #[serde(rename = "M")]
    pub emv_count: u32,
    /// Number of ordinary vehicles.
    #[serde(rename = "N")]
    pub ov_count: u32,
    /// Nominal speed in cells per time step.
    #[serde(rename = "V")]
    pub nominal_speed: u32,
    /// Physical cell length in metres; only feeds the display aspect.
    #[serde(rename = "A")]
    pub cell_length: f64,
    /// Physical cell width in metres; only feeds the display aspect.
    #[serde(rename = "B")]
    pub cell_width: f64,
    /// Acceleration bound in cells per time step squared. The greedy model
    /// holds speeds constant and never reads it.
    #[serde(rename = "a+", default)]
    pub acc_max: f64,
    /// Deceleration bound in cells per time step squared. Unused, as above.
    #[serde(rename = "a-", default)]
    pub acc_min: f64,
    /// Initial `[position, lane, speed]` of each EMV.
    #[serde(rename = "EMV_initial_state")]
    pub emv_initial_state: Vec<[u32; 3]>,
    /// Initial `[position, lane, speed]` of each OV.
    #[serde(rename = "OV_initial_state")]
    pub ov_initial_state: Vec<[u32; 3]>,
    /// Solver-produced OV positions, a row-major `T`×`N` table.
    #[serde(rename = "OV_traj_dist", default)]
    pub ov_traj_dist: Option<Vec<u32>>,
    /// Solver-produced OV lanes, a row-major `T`×`N` table.
    #[serde(rename = "OV_traj_lane", default)]
    pub ov_traj_lane: Option<Vec<u32>>,
    /// Solver-produced OV speeds, a row-major `T`×`N` table.
    #[serde(rename = "OV_traj_speed", default)]
    pub ov_traj_speed: Option<Vec<u32>>,
    /// Solver-produced EMV lanes, a row-major `T`×`M` table.
    #[serde(rename = "EMV_traj_lane", default)]
    pub emv_traj_lane: Option<Vec<u32>>,
}

impl ScenarioConfig {
    /// Reads and validates a scenario from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("opening scenario {}", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing scenario {}", path.display()))?;
        config.validate()?;
        log::info!(
            "loaded scenario {}: {} EMVs, {} OVs, {}x{} grid, horizon {}",
            path.display(),
            config.emv_count,
            config.ov_count,
            config.cells_per_lane,
            config.lanes,
            config.horizon
        );
        Ok(config)
    }

    /// Parses and validates a scenario from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("parsing scenario")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the declared vehicle counts and grid bounds.
    ///
    /// The core trusts its inputs, so bounds correctness is established
    /// here, at the load boundary.
    fn validate(&self) -> Result<()> {
        if self.cells_per_lane == 0 || self.lanes == 0 {
            bail!(
                "grid dimensions must be positive, got {}x{}",
                self.cells_per_lane,
                self.lanes
            );
        }
        if self.emv_initial_state.len() != self.emv_count as usize {
            bail!(
                "scenario declares {} EMVs but lists {} initial states",
                self.emv_count,
                self.emv_initial_state.len()
            );
        }
        if self.ov_initial_state.len() != self.ov_count as usize {
            bail!(
                "scenario declares {} OVs but lists {} initial states",
                self.ov_count,
                self.ov_initial_state.len()
            );
        }

        let vehicles = self
            .emv_initial_state
            .iter()
            .map(|state| ("EMV", state))
            .chain(self.ov_initial_state.iter().map(|state| ("OV", state)));
        for (class, &[position, lane, _]) in vehicles {
            if lane >= self.lanes {
                bail!("{} lane {} outside 0..{}", class, lane, self.lanes);
            }
            if position > self.cells_per_lane {
                bail!(
                    "{} position {} outside the {}-cell grid",
                    class,
                    position,
                    self.cells_per_lane
                );
            }
        }
        Ok(())
    }

    /// The initial EMV states, keyed by 1-based ID in declaration order.
    pub fn emv_states(&self) -> VehicleSet {
        states(&self.emv_initial_state)
    }

    /// The initial OV states, keyed by 1-based ID in declaration order.
    pub fn ov_states(&self) -> VehicleSet {
        states(&self.ov_initial_state)
    }

    /// The display aspect ratio of a single cell.
    pub fn cell_aspect(&self) -> f64 {
        self.cell_width / self.cell_length
    }
}

fn states(list: &[[u32; 3]]) -> VehicleSet {
    list.iter()
        .enumerate()
        .map(|(idx, &[position, lane, speed])| {
            (idx as u32 + 1, VehicleState::new(position, lane, speed))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    const MINIMAL: &str = r#"{
        "T": 4, "I": 10, "L": 3, "M": 1, "N": 2, "V": 2,
        "A": 5.0, "B": 3.0, "a+": 1.0, "a-": 2.0,
        "EMV_initial_state": [[0, 2, 2]],
        "OV_initial_state": [[1, 0, 1], [3, 1, 1]],
        "weight": [1, 1, 1]
    }"#;

    #[test]
    fn parses_renamed_keys_and_ignores_unknown_fields() {
        let config = ScenarioConfig::from_json(MINIMAL).unwrap();
        assert_eq!(config.horizon, 4);
        assert_eq!(config.cells_per_lane, 10);
        assert_eq!(config.lanes, 3);
        assert_eq!(config.nominal_speed, 2);
        assert_eq!(config.acc_max, 1.0);
        assert!(config.ov_traj_dist.is_none());
    }

    #[test]
    fn builds_one_based_vehicle_sets_in_declaration_order() {
        let config = ScenarioConfig::from_json(MINIMAL).unwrap();
        let ovs = config.ov_states();
        assert_eq!(ovs.len(), 2);
        assert_eq!(ovs[&1], VehicleState::new(1, 0, 1));
        assert_eq!(ovs[&2], VehicleState::new(3, 1, 1));
        assert_eq!(config.emv_states()[&1], VehicleState::new(0, 2, 2));
    }

    #[test]
    fn rejects_mismatched_counts() {
        let json = MINIMAL.replace("\"N\": 2", "\"N\": 3");
        assert!(ScenarioConfig::from_json(&json).is_err());
    }

    #[test]
    fn rejects_out_of_range_lanes() {
        let json = MINIMAL.replace("[3, 1, 1]", "[3, 3, 1]");
        assert!(ScenarioConfig::from_json(&json).is_err());
    }

    #[test]
    fn rejects_positions_off_the_grid() {
        let json = MINIMAL.replace("[3, 1, 1]", "[11, 1, 1]");
        assert!(ScenarioConfig::from_json(&json).is_err());
    }
}
