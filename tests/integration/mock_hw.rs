//! Mock adapters for integration tests.
//!
//! `MockBoard` stands in for the relay/input HAT and records every write,
//! `MemStore` replaces the mailbox directory, and `RecordingSink` keeps
//! every emitted event.  `Rig` wires them to an `AppService` on a
//! simulated 20 ms clock.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};

use pickmark::app::commands::Command;
use pickmark::app::events::{AppEvent, Status};
use pickmark::app::ports::{CounterStore, DigitalIo, EventSink, Mailbox};
use pickmark::app::service::AppService;
use pickmark::config::SystemConfig;
use pickmark::io_map::Address;
use pickmark::{IoError, StoreError};

// ── Board layout used by every test ───────────────────────────

pub const BTN_START: Address = Address::new(0, 1);
pub const OBJECT: Address = Address::new(0, 2);
pub const READY: Address = Address::new(0, 3);
pub const NEXT: Address = Address::new(0, 4);
pub const R_ERROR: Address = Address::new(1, 1);

pub const START_OUT: Address = Address::new(0, 1);
pub const CONTINUE_OUT: Address = Address::new(0, 2);
pub const OVER_OUT: Address = Address::new(0, 3);
pub const COUNT_OK_OUT: Address = Address::new(0, 4);
pub const CALIB_OUT: Address = Address::new(1, 1);
pub const ALIVE_OUT: Address = Address::new(1, 2);

pub const ALL_OUTPUTS: [Address; 6] = [
    START_OUT,
    CONTINUE_OUT,
    OVER_OUT,
    COUNT_OK_OUT,
    CALIB_OUT,
    ALIVE_OUT,
];

pub const CONFIG_YAML: &str = r"
loop_ms: 20
debounce_obj_ms: 80
batch_size: 10
target_default: 100
pulse_ms: 150
heartbeat_ms: 500
stack_level: 0
inputs:
  btn_start: 1
  object_signal: 2
  ready_signal: 3
  next_signal: 4
  r_error: {stack: 1, ch: 1}
outputs:
  start_signal: 1
  continue_signal: 2
  over_signal: 3
  count_ok: 4
  r_calib_req: {stack: 1, ch: 1}
  pi_alive: {stack: 1, ch: 2}
";

pub fn test_config() -> SystemConfig {
    SystemConfig::from_yaml(CONFIG_YAML).unwrap()
}

// ── MockBoard ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockBoard {
    inputs: HashMap<Address, bool>,
    outputs: HashMap<Address, bool>,
    pub writes: Vec<(Address, bool)>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, addr: Address, level: bool) {
        self.inputs.insert(addr, level);
    }

    /// Physical output level as last written (low if never written).
    pub fn output(&self, addr: Address) -> bool {
        self.outputs.get(&addr).copied().unwrap_or(false)
    }

    pub fn writes_to(&self, addr: Address) -> Vec<bool> {
        self.writes
            .iter()
            .filter(|(a, _)| *a == addr)
            .map(|&(_, v)| v)
            .collect()
    }
}

impl DigitalIo for MockBoard {
    fn read(&mut self, addr: Address) -> Result<bool, IoError> {
        if self.fail_reads {
            return Err(IoError::Unavailable {
                op: "read",
                last: "mock read failure".into(),
            });
        }
        Ok(self.inputs.get(&addr).copied().unwrap_or(false))
    }

    fn write(&mut self, addr: Address, on: bool) -> Result<(), IoError> {
        if self.fail_writes {
            return Err(IoError::Unavailable {
                op: "write",
                last: "mock write failure".into(),
            });
        }
        self.writes.push((addr, on));
        self.outputs.insert(addr, on);
        Ok(())
    }
}

// ── MemStore ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MemStore {
    pub commands: VecDeque<Command>,
    pub statuses: Vec<Status>,
    pub saved_counts: Vec<u32>,
    pub persisted: u32,
    /// Number of `load_count` calls.
    pub loads: Cell<u32>,
}

#[allow(dead_code)]
impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_status(&self) -> &Status {
        self.statuses.last().unwrap()
    }
}

impl Mailbox for MemStore {
    fn try_take_command(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    fn publish_status(&mut self, status: &Status) -> Result<(), StoreError> {
        self.statuses.push(status.clone());
        Ok(())
    }
}

impl CounterStore for MemStore {
    fn load_count(&self) -> u32 {
        self.loads.set(self.loads.get() + 1);
        self.persisted
    }

    fn save_count(&mut self, count: u32) -> Result<(), StoreError> {
        self.persisted = count;
        self.saved_counts.push(count);
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub const TICK_MS: u64 = 20;

pub struct Rig {
    pub app: AppService,
    pub board: MockBoard,
    pub store: MemStore,
    pub sink: RecordingSink,
    pub now: u64,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: SystemConfig) -> Self {
        Self::build(config, MemStore::new())
    }

    /// Start against a pre-seeded store (e.g. a counter left by a
    /// previous process).
    pub fn with_store(store: MemStore) -> Self {
        Self::build(test_config(), store)
    }

    fn build(config: SystemConfig, store: MemStore) -> Self {
        let mut rig = Self {
            app: AppService::new(config).unwrap(),
            board: MockBoard::new(),
            store,
            sink: RecordingSink::default(),
            now: 0,
        };
        rig.app
            .start(&mut rig.board, &mut rig.store, &mut rig.sink, rig.now);
        rig
    }

    /// Advance the clock one period and run a tick.
    pub fn tick(&mut self) {
        self.now += TICK_MS;
        self.app
            .tick(&mut self.board, &mut self.store, &mut self.sink, self.now);
    }

    pub fn ticks(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    pub fn command(&mut self, cmd: Command) {
        self.store.commands.push_back(cmd);
        self.tick();
    }

    /// One object: sensor high for a tick, then low long enough to clear
    /// the debounce window.
    pub fn object(&mut self) {
        self.board.set_input(OBJECT, true);
        self.tick();
        self.board.set_input(OBJECT, false);
        self.ticks(4);
    }

    /// Sensor high for one tick only (the counting tick).
    pub fn object_edge(&mut self) {
        self.board.set_input(OBJECT, true);
        self.tick();
        self.board.set_input(OBJECT, false);
    }

    pub fn pulse_input(&mut self, addr: Address) {
        self.board.set_input(addr, true);
        self.tick();
        self.board.set_input(addr, false);
    }

    pub fn all_outputs_low(&self) -> bool {
        ALL_OUTPUTS.iter().all(|&a| !self.board.output(a))
    }
}
