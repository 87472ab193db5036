//! End-to-end tests through the real file mailbox in a temp directory.

use pickmark::adapters::file_mailbox::FileMailbox;
use pickmark::app::events::Status;
use pickmark::app::service::AppService;
use pickmark::fsm::StateId;
use tempfile::TempDir;

use crate::mock_hw::{MockBoard, RecordingSink, OBJECT, test_config};

struct FileRig {
    _dir: TempDir,
    app: AppService,
    board: MockBoard,
    mailbox: FileMailbox,
    sink: RecordingSink,
    now: u64,
}

impl FileRig {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut rig = Self {
            app: AppService::new(test_config()).unwrap(),
            board: MockBoard::new(),
            mailbox: FileMailbox::new(dir.path()),
            sink: RecordingSink::default(),
            _dir: dir,
            now: 0,
        };
        rig.app
            .start(&mut rig.board, &mut rig.mailbox, &mut rig.sink, 0);
        rig
    }

    fn tick(&mut self) {
        self.now += 20;
        self.app
            .tick(&mut self.board, &mut self.mailbox, &mut self.sink, self.now);
    }

    fn drop_command(&self, json: &str) {
        std::fs::write(self.mailbox.command_path(), json).unwrap();
    }

    fn status(&self) -> Status {
        let text = std::fs::read_to_string(self.mailbox.status_path()).unwrap();
        serde_json::from_str(&text).unwrap()
    }
}

#[test]
fn status_file_exists_after_start() {
    let rig = FileRig::new();
    let status = rig.status();
    assert_eq!(status.mode, StateId::Idle);
    assert_eq!(status.batch_size, 10);
}

#[test]
fn command_file_is_consumed_and_applied() {
    let mut rig = FileRig::new();
    rig.drop_command(r#"{"auto": true, "target": 3, "reset": false, "calib": false, "ts": 1700000000.5}"#);
    rig.tick();
    assert!(!rig.mailbox.command_path().exists());
    let status = rig.status();
    assert_eq!(status.mode, StateId::PickIn);
    assert_eq!(status.target_n, 3);
}

#[test]
fn malformed_command_file_is_discarded() {
    let mut rig = FileRig::new();
    rig.drop_command("{\"auto\": tru");
    rig.tick();
    assert!(!rig.mailbox.command_path().exists());
    assert_eq!(rig.status().mode, StateId::Idle);
}

#[test]
fn counter_file_tracks_total() {
    let mut rig = FileRig::new();
    rig.drop_command(r#"{"auto": true, "target": 5}"#);
    rig.tick();
    for _ in 0..2 {
        rig.board.set_input(OBJECT, true);
        rig.tick();
        rig.board.set_input(OBJECT, false);
        for _ in 0..4 {
            rig.tick();
        }
    }
    let raw = std::fs::read_to_string(rig.mailbox.counter_path()).unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(v["count"], 2);
    assert_eq!(rig.status().total_done, 2);
}

#[test]
fn status_mode_is_always_a_known_name() {
    let mut rig = FileRig::new();
    rig.drop_command(r#"{"auto": true, "target": 2}"#);
    for _ in 0..20 {
        rig.tick();
        let raw = std::fs::read_to_string(rig.mailbox.status_path()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let mode = v["mode"].as_str().unwrap();
        assert!(
            ["IDLE", "STARTING", "PICK_IN", "MARKING", "AFTER_MARK", "ERROR"].contains(&mode),
            "unexpected mode {mode}"
        );
        assert!(v["total_done"].as_u64().is_some());
        assert!(v["batch_count"].as_u64().is_some());
    }
}
