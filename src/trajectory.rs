//! Replay of externally optimized trajectories.
//!
//! Scenario files may carry solver-produced trajectory tables alongside the
//! initial states. This module rebuilds the snapshot sequence those tables
//! describe and diffs it into discrete lane- and speed-change events.

use crate::{ScenarioConfig, Snapshot, VehicleId, VehicleSet, VehicleState};
use anyhow::{bail, Context, Result};

/// A snapshot sequence reconstructed from solver trajectory tables.
pub struct ExactReplay {
    snapshots: Vec<Snapshot>,
}

impl ExactReplay {
    /// Rebuilds the `T + 1` snapshots described by the scenario's trajectory
    /// tables, with the initial state at t=0.
    ///
    /// OV states are read directly from the tables. EMV lanes come from the
    /// table while EMV positions advance from the initial state at the
    /// nominal speed, which the solver holds constant.
    pub fn from_config(config: &ScenarioConfig) -> Result<Self> {
        let horizon = config.horizon as usize;
        let ov_dist = table(&config.ov_traj_dist, horizon, config.ov_count, "OV_traj_dist")?;
        let ov_lane = table(&config.ov_traj_lane, horizon, config.ov_count, "OV_traj_lane")?;
        let ov_speed = table(&config.ov_traj_speed, horizon, config.ov_count, "OV_traj_speed")?;
        let emv_lane = table(&config.emv_traj_lane, horizon, config.emv_count, "EMV_traj_lane")?;

        let emv_init = config.emv_states();
        let mut snapshots = vec![Snapshot {
            time: 0,
            emvs: emv_init.clone(),
            ovs: config.ov_states(),
        }];

        for t in 0..horizon {
            let ovs: VehicleSet = (0..config.ov_count as usize)
                .map(|n| {
                    let state = VehicleState::new(ov_dist[t][n], ov_lane[t][n], ov_speed[t][n]);
                    (n as u32 + 1, state)
                })
                .collect();
            let emvs: VehicleSet = emv_init
                .iter()
                .map(|(&m, init)| {
                    let position = init.position + (t as u32 + 1) * config.nominal_speed;
                    let lane = emv_lane[t][(m - 1) as usize];
                    (m, VehicleState::new(position, lane, config.nominal_speed))
                })
                .collect();
            snapshots.push(Snapshot {
                time: t as u32 + 1,
                emvs,
                ovs,
            });
        }

        Ok(Self { snapshots })
    }

    /// The replayed snapshots, from t=0 to t=T.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Enumerates the manoeuvres in the replay.
    pub fn changes(&self) -> ChangeLog {
        ChangeLog::of(&self.snapshots)
    }
}

/// Views a flat row-major trajectory list as `rows` rows of `cols` values.
fn table<'a>(
    field: &'a Option<Vec<u32>>,
    rows: usize,
    cols: u32,
    name: &str,
) -> Result<Vec<&'a [u32]>> {
    let values = field
        .as_ref()
        .with_context(|| format!("scenario has no {} table", name))?;
    let cols = cols as usize;
    if cols == 0 || values.len() != rows * cols {
        bail!(
            "{} holds {} values, expected {}x{}",
            name,
            values.len(),
            rows,
            cols
        );
    }
    Ok(values.chunks_exact(cols).collect())
}

/// One discrete manoeuvre: at `time`, `vehicle` changed a quantity by `delta`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The time step on which the manoeuvre begins.
    pub time: u32,
    /// The vehicle performing it.
    pub vehicle: VehicleId,
    /// Signed size of the change.
    pub delta: i64,
}

/// The lane and speed changes of one vehicle class.
#[derive(Clone, Debug, Default)]
pub struct ClassChanges {
    pub lane_changes: Vec<ChangeEvent>,
    pub speed_changes: Vec<ChangeEvent>,
}

/// All manoeuvres in a snapshot sequence.
#[derive(Clone, Debug, Default)]
pub struct ChangeLog {
    pub emvs: ClassChanges,
    pub ovs: ClassChanges,
}

impl ChangeLog {
    /// Diffs consecutive snapshots into change events. A difference between
    /// the snapshots at `t` and `t + 1` is stamped `t`, the step on which
    /// the manoeuvre must begin to take effect by `t + 1`.
    pub fn of(snapshots: &[Snapshot]) -> Self {
        let mut log = Self::default();
        snapshots.windows(2).for_each(|pair| {
            if let [prev, next] = pair {
                let time = next.time - 1;
                record(&mut log.emvs, time, &prev.emvs, &next.emvs);
                record(&mut log.ovs, time, &prev.ovs, &next.ovs);
            }
        });
        log
    }

    /// Total number of recorded manoeuvres.
    pub fn total(&self) -> usize {
        self.emvs.lane_changes.len()
            + self.emvs.speed_changes.len()
            + self.ovs.lane_changes.len()
            + self.ovs.speed_changes.len()
    }
}

fn record(changes: &mut ClassChanges, time: u32, prev: &VehicleSet, next: &VehicleSet) {
    for (&id, state) in next {
        let before = prev[&id];
        if state.lane != before.lane {
            changes.lane_changes.push(ChangeEvent {
                time,
                vehicle: id,
                delta: state.lane as i64 - before.lane as i64,
            });
        }
        if state.speed != before.speed {
            changes.speed_changes.push(ChangeEvent {
                time,
                vehicle: id,
                delta: state.speed as i64 - before.speed as i64,
            });
        }
    }
}
