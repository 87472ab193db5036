//! Integration tests for operator command application.

use pickmark::app::commands::Command;
use pickmark::app::events::AppEvent;
use pickmark::fsm::StateId;

use crate::mock_hw::{BTN_START, CALIB_OUT, OBJECT, R_ERROR, Rig, START_OUT};

fn in_pick_in_with(target: u32, objects: u32) -> Rig {
    let mut rig = Rig::new();
    rig.command(Command::auto(target));
    for _ in 0..objects {
        rig.object();
    }
    rig
}

// ── auto ──────────────────────────────────────────────────────

#[test]
fn auto_arms_target_and_starts() {
    let mut rig = Rig::new();
    rig.command(Command::auto(42));
    assert_eq!(rig.app.state(), StateId::PickIn);
    assert_eq!(rig.app.target_n(), 42);
    assert!(rig.app.target_set());
    assert!(rig.board.output(START_OUT));
    assert!(rig.sink.events.contains(&AppEvent::CommandApplied {
        reset: false,
        calib: false,
        target: Some(42),
    }));
}

#[test]
fn auto_restarts_counting_mid_run() {
    let mut rig = in_pick_in_with(25, 4);
    assert_eq!(rig.app.total_done(), 4);
    rig.command(Command::auto(30));
    assert_eq!(rig.app.total_done(), 0);
    assert_eq!(rig.app.batch_count(), 0);
    assert_eq!(rig.app.target_n(), 30);
    assert_eq!(rig.app.state(), StateId::PickIn);
}

#[test]
fn non_positive_target_is_ignored() {
    for raw in [
        r#"{"auto": true, "target": 0}"#,
        r#"{"auto": true, "target": -5}"#,
        r#"{"auto": true, "target": "lots"}"#,
        r#"{"auto": true}"#,
    ] {
        let mut rig = Rig::new();
        rig.command(Command::parse(raw.as_bytes()).unwrap());
        assert_eq!(rig.app.state(), StateId::Idle, "{raw}");
        assert!(!rig.app.target_set(), "{raw}");
        assert_eq!(rig.app.target_n(), 100, "{raw}");
    }
}

#[test]
fn string_target_is_accepted() {
    let mut rig = Rig::new();
    rig.command(Command::parse(br#"{"auto": true, "target": "12"}"#).unwrap());
    assert_eq!(rig.app.target_n(), 12);
    assert_eq!(rig.app.state(), StateId::PickIn);
}

// ── reset ─────────────────────────────────────────────────────

#[test]
fn reset_mid_pick_in_clears_everything() {
    let mut rig = in_pick_in_with(25, 7);
    assert_eq!(rig.app.batch_count(), 7);
    rig.board.set_input(OBJECT, false);

    rig.command(Command::reset());
    assert_eq!(rig.app.state(), StateId::Idle);
    assert_eq!(rig.app.total_done(), 0);
    assert_eq!(rig.app.batch_count(), 0);
    assert!(!rig.app.target_set());
    assert!(rig.all_outputs_low());
}

#[test]
fn reset_leaves_error() {
    let mut rig = in_pick_in_with(25, 2);
    rig.board.set_input(R_ERROR, true);
    rig.tick();
    assert_eq!(rig.app.state(), StateId::Error);

    rig.board.set_input(R_ERROR, false);
    rig.command(Command::reset());
    assert_eq!(rig.app.state(), StateId::Idle);
    assert!(rig.store.last_status().error.is_empty());
}

#[test]
fn reset_with_fault_still_asserted_stays_in_error() {
    let mut rig = Rig::new();
    rig.board.set_input(R_ERROR, true);
    rig.tick();
    rig.command(Command::reset());
    assert_eq!(rig.app.state(), StateId::Error);
}

#[test]
fn auto_is_ignored_in_error() {
    let mut rig = Rig::new();
    rig.board.set_input(R_ERROR, true);
    rig.tick();
    rig.board.set_input(R_ERROR, false);
    rig.command(Command::auto(10));
    assert_eq!(rig.app.state(), StateId::Error);
    assert!(!rig.app.target_set());
}

#[test]
fn reset_then_auto_in_one_command() {
    let mut rig = in_pick_in_with(25, 3);
    rig.command(Command {
        reset: true,
        auto: true,
        target: Some(5),
        ..Command::default()
    });
    assert_eq!(rig.app.state(), StateId::PickIn);
    assert_eq!(rig.app.target_n(), 5);
    assert_eq!(rig.app.total_done(), 0);
    assert!(rig.app.target_set());
}

// ── calib ─────────────────────────────────────────────────────

#[test]
fn calib_pulses_request_and_idles() {
    let mut rig = in_pick_in_with(25, 3);
    rig.command(Command::calib());
    assert_eq!(rig.app.state(), StateId::Idle);
    assert!(rig.board.output(CALIB_OUT));
    // The run is paused, not discarded.
    assert_eq!(rig.app.total_done(), 3);
    assert!(rig.app.target_set());
}

#[test]
fn start_button_resumes_after_calib() {
    let mut rig = in_pick_in_with(25, 3);
    rig.command(Command::calib());
    rig.ticks(10);

    rig.pulse_input(BTN_START);
    assert_eq!(rig.app.state(), StateId::Starting);
    rig.tick();
    assert_eq!(rig.app.state(), StateId::PickIn);
    assert_eq!(rig.app.total_done(), 3);
    assert!(rig.board.output(START_OUT));
}

#[test]
fn calib_then_auto_in_one_command_starts() {
    let mut rig = Rig::new();
    rig.command(Command {
        calib: true,
        auto: true,
        target: Some(8),
        ..Command::default()
    });
    assert_eq!(rig.app.state(), StateId::PickIn);
    assert!(rig.board.output(CALIB_OUT));
    assert!(rig.board.output(START_OUT));
}

#[test]
fn one_command_per_tick() {
    let mut rig = Rig::new();
    rig.store.commands.push_back(Command::auto(10));
    rig.store.commands.push_back(Command::reset());
    rig.tick();
    assert_eq!(rig.app.state(), StateId::PickIn);
    rig.tick();
    assert_eq!(rig.app.state(), StateId::Idle);
}
