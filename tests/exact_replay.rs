//! Tests of solver-trajectory replay and manoeuvre extraction.

use emv_sim::{ChangeEvent, ExactReplay, ScenarioConfig, VehicleState};

/// One EMV and one OV with two solved time steps: the OV merges into lane 1
/// and speeds up, the EMV drops into lane 0.
const SOLVED: &str = r#"{
    "T": 2, "I": 10, "L": 2, "M": 1, "N": 1, "V": 2,
    "A": 5.0, "B": 3.0,
    "EMV_initial_state": [[0, 1, 2]],
    "OV_initial_state": [[0, 0, 1]],
    "OV_traj_dist": [1, 3],
    "OV_traj_lane": [0, 1],
    "OV_traj_speed": [1, 2],
    "EMV_traj_lane": [1, 0]
}"#;

fn scenario(json: &str) -> ScenarioConfig {
    ScenarioConfig::from_json(json).expect("valid scenario")
}

/// Test that a replay yields T+1 snapshots starting from the initial state.
#[test]
fn replay_rebuilds_the_solved_states() {
    let replay = ExactReplay::from_config(&scenario(SOLVED)).unwrap();
    let snapshots = replay.snapshots();
    assert_eq!(snapshots.len(), 3);

    assert_eq!(snapshots[0].emvs[&1], VehicleState::new(0, 1, 2));
    assert_eq!(snapshots[0].ovs[&1], VehicleState::new(0, 0, 1));

    // EMV positions advance at the nominal speed; lanes come from the table.
    assert_eq!(snapshots[1].emvs[&1], VehicleState::new(2, 1, 2));
    assert_eq!(snapshots[2].emvs[&1], VehicleState::new(4, 0, 2));

    assert_eq!(snapshots[1].ovs[&1], VehicleState::new(1, 0, 1));
    assert_eq!(snapshots[2].ovs[&1], VehicleState::new(3, 1, 2));
}

/// Test that diffing the replay finds each manoeuvre once, stamped with the
/// step on which it begins.
#[test]
fn change_log_enumerates_manoeuvres() {
    let replay = ExactReplay::from_config(&scenario(SOLVED)).unwrap();
    let changes = replay.changes();

    assert_eq!(
        changes.emvs.lane_changes,
        vec![ChangeEvent {
            time: 1,
            vehicle: 1,
            delta: -1
        }]
    );
    assert!(changes.emvs.speed_changes.is_empty());
    assert_eq!(
        changes.ovs.lane_changes,
        vec![ChangeEvent {
            time: 1,
            vehicle: 1,
            delta: 1
        }]
    );
    assert_eq!(
        changes.ovs.speed_changes,
        vec![ChangeEvent {
            time: 1,
            vehicle: 1,
            delta: 1
        }]
    );
    assert_eq!(changes.total(), 3);
}

/// Test that a scenario without trajectory tables cannot be replayed.
#[test]
fn missing_tables_are_an_error() {
    let json = r#"{
        "T": 2, "I": 10, "L": 2, "M": 1, "N": 1, "V": 2,
        "A": 5.0, "B": 3.0,
        "EMV_initial_state": [[0, 1, 2]],
        "OV_initial_state": [[0, 0, 1]]
    }"#;
    assert!(ExactReplay::from_config(&scenario(json)).is_err());
}

/// Test that a table whose length disagrees with T and N is rejected.
#[test]
fn misshapen_tables_are_an_error() {
    let json = SOLVED.replace("\"OV_traj_dist\": [1, 3]", "\"OV_traj_dist\": [1, 3, 5]");
    assert!(ExactReplay::from_config(&scenario(&json)).is_err());
}
