//! The greedy state-transition model.

use crate::{ScenarioConfig, Snapshot, VehicleSet};
use itertools::Itertools;

/// Advances vehicle states one time step at a time.
///
/// EMVs converge laterally, one lane per step, on the lane that held the
/// fewest OVs at t=0 while advancing at their own constant speed. OVs hold
/// their lane and speed for the whole horizon.
pub struct GreedySimulator {
    /// The lane all EMVs steer towards.
    target_lane: u32,
    /// EMV states at t=0.
    emv_init: VehicleSet,
    /// OV states at t=0.
    ov_init: VehicleSet,
}

impl GreedySimulator {
    /// Creates a simulator for the given scenario.
    ///
    /// # Panics
    /// Panics if the scenario declares no OVs, since the target lane is
    /// undefined without them.
    pub fn new(config: &ScenarioConfig) -> Self {
        let ov_init = config.ov_states();
        let target_lane = target_lane_of(&ov_init);
        log::debug!("EMV target lane is {}", target_lane);
        Self {
            target_lane,
            emv_init: config.emv_states(),
            ov_init,
        }
    }

    /// The lane all EMVs converge towards.
    pub fn target_lane(&self) -> u32 {
        self.target_lane
    }

    /// Computes the vehicle states one time step after the given ones.
    ///
    /// The inputs are left untouched; freshly built sets are returned.
    pub fn transition(&self, emvs: &VehicleSet, ovs: &VehicleSet) -> (VehicleSet, VehicleSet) {
        let next_emvs = emvs
            .iter()
            .map(|(&id, state)| {
                let mut next = *state;
                // One lane per step towards the target, regardless of speed.
                if state.lane > self.target_lane {
                    next.lane -= 1;
                } else if state.lane < self.target_lane {
                    next.lane += 1;
                }
                if next.lane != state.lane {
                    log::trace!("EMV {} moves from lane {} to lane {}", id, state.lane, next.lane);
                }
                next.position += state.speed;
                (id, next)
            })
            .collect();

        let next_ovs = ovs
            .iter()
            .map(|(&id, state)| {
                let mut next = *state;
                next.position += state.speed;
                (id, next)
            })
            .collect();

        (next_emvs, next_ovs)
    }

    /// Runs the greedy model for `horizon` steps, eagerly materializing one
    /// snapshot per time step starting from the initial state.
    pub fn run(&self, horizon: u32) -> Vec<Snapshot> {
        let mut snapshots = Vec::with_capacity(horizon as usize);
        let mut emvs = self.emv_init.clone();
        let mut ovs = self.ov_init.clone();

        for time in 0..horizon {
            if time > 0 {
                (emvs, ovs) = self.transition(&emvs, &ovs);
            }
            snapshots.push(Snapshot {
                time,
                emvs: emvs.clone(),
                ovs: ovs.clone(),
            });
        }

        log::info!("simulated {} time steps", snapshots.len());
        snapshots
    }
}

/// Finds the lane holding the fewest OVs; the lowest lane index wins ties.
fn target_lane_of(ovs: &VehicleSet) -> u32 {
    ovs.values()
        .map(|state| state.lane)
        .counts()
        .into_iter()
        .min_by_key(|&(lane, count)| (count, lane))
        .map(|(lane, _)| lane)
        .expect("cannot derive a target lane from a scenario with no OVs")
}
