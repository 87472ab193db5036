//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the FSM, safety supervisor, output latch, pulse
//! scheduler and the shared context.  It exposes a hardware-agnostic
//! API.  All I/O flows through port traits injected at call sites,
//! making the entire service testable with mock adapters.
//!
//! ```text
//!  DigitalIo ◀──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │        AppService         │
//!  Mailbox   ◀──▶ │  FSM · Safety · Pulses    │
//!  Counter   ◀──  └──────────────────────────┘
//! ```
//!
//! ## Tick order
//!
//! 1. heartbeat toggle
//! 2. expired pulses driven low
//! 3. at most one operator command
//! 4. inputs sampled (a failed read ends the tick here)
//! 5. object edge debounced
//! 6. safety: robot fault forces every output low and `Error`
//! 7. FSM update, requested pulses fired
//! 8. counter persisted if an object was counted
//! 9. status published

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::drivers::debounce::EdgeDetector;
use crate::drivers::heartbeat::Heartbeat;
use crate::drivers::latch::OutputLatch;
use crate::error::{ConfigError, IoError, SafetyFault};
use crate::fsm::context::{FsmContext, InputSnapshot};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::io_map::{InputSignal, IoMap, OutputSignal};
use crate::safety::SafetySupervisor;
use crate::scheduler::PulseScheduler;

use super::commands::Command;
use super::events::{unix_secs, AppEvent, Status};
use super::ports::{Clock, CounterStore, DigitalIo, EventSink, Mailbox};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all cycle logic.
pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    safety: SafetySupervisor,
    io_map: IoMap,
    latch: OutputLatch,
    pulses: PulseScheduler,
    edge: EdgeDetector,
    heartbeat: Heartbeat,
    /// Problem seen during the current tick; published in the status.
    error: String,
    tick_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Fails only if a required input is missing from the I/O map.
    /// Does **not** touch the board; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Result<Self, ConfigError> {
        let io_map = config.io_map()?;
        let latch = OutputLatch::new(io_map.clone());
        let edge = EdgeDetector::new(config.debounce_obj_ms);
        let heartbeat = Heartbeat::new(config.heartbeat_ms, 0);
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Idle);

        Ok(Self {
            fsm,
            ctx,
            safety: SafetySupervisor::new(),
            io_map,
            latch,
            pulses: PulseScheduler::new(),
            edge,
            heartbeat,
            error: String::new(),
            tick_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every output low, start the FSM in `Idle` and publish the
    /// first status.
    pub fn start(
        &mut self,
        io: &mut impl DigitalIo,
        store: &mut (impl Mailbox + CounterStore),
        sink: &mut impl EventSink,
        now_ms: u64,
    ) {
        self.heartbeat = Heartbeat::new(self.ctx.config.heartbeat_ms, now_ms);
        if let Err(e) = self.latch.force_all_low(io) {
            self.note_write_error(&e);
        }

        // A run always starts from zero; the persisted count is only
        // reported so an interrupted run can be reconciled by hand.
        let persisted = store.load_count();
        info!("Persisted counter from previous run: {persisted}");

        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AppService started in {:?}", self.fsm.current_state());
        self.publish(store);
    }

    /// Drive every output low and publish a final status.
    pub fn shutdown(&mut self, io: &mut impl DigitalIo, store: &mut impl Mailbox) {
        info!("AppService shutting down, forcing outputs low");
        self.error.clear();
        self.pulses.clear();
        if let Err(e) = self.latch.force_all_low(io) {
            self.note_write_error(&e);
        }
        self.publish(store);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle.
    ///
    /// `store` satisfies **both** [`Mailbox`] and [`CounterStore`]; the
    /// file adapter implements the two over one directory.
    pub fn tick(
        &mut self,
        io: &mut impl DigitalIo,
        store: &mut (impl Mailbox + CounterStore),
        sink: &mut impl EventSink,
        now_ms: u64,
    ) {
        self.tick_count += 1;
        self.error.clear();
        let prev_state = self.fsm.current_state();

        // 1. Heartbeat
        if self.heartbeat.due(now_ms) {
            let level = !self.latch.state(OutputSignal::Heartbeat).unwrap_or(false);
            if let Err(e) = self.latch.set(io, OutputSignal::Heartbeat, level) {
                self.note_write_error(&e);
            }
        }

        // 2. Pulse expiry
        if let Err(e) = self.pulses.service(&mut self.latch, io, now_ms) {
            self.note_write_error(&e);
        }

        // 3. Operator command
        if let Some(cmd) = store.try_take_command() {
            self.handle_command(&cmd, io, sink, now_ms);
        }

        // 4. Inputs
        match self.read_inputs(io) {
            Ok(snapshot) => self.ctx.inputs = snapshot,
            Err(e) => {
                warn!("Input read failed: {e}");
                self.error = format!("IO read error: {e}");
                self.finish_tick(prev_state, store, sink);
                return;
            }
        }

        // 5. Object edge
        self.ctx.object_edge = self.edge.detect(self.ctx.inputs.object, now_ms);

        // 6. Safety
        let had_faults = self.safety.has_faults();
        self.safety.evaluate(&self.ctx.inputs);
        if self.safety.has_faults() {
            if !had_faults {
                warn!("Safety fault! flags=0b{:08b}", self.safety.faults());
                sink.emit(&AppEvent::FaultDetected(SafetyFault::RobotError));
            }
            self.pulses.clear();
            if let Err(e) = self.latch.force_all_low(io) {
                self.note_write_error(&e);
            }
            self.fsm.force_transition(StateId::Error, &mut self.ctx);
            // Outputs are already low; error_enter's request is satisfied.
            self.ctx.take_requests();
            self.error = "Robot error".to_string();
            self.finish_tick(prev_state, store, sink);
            return;
        } else if had_faults {
            sink.emit(&AppEvent::FaultCleared);
        }

        // 7. FSM
        self.ctx.counted = false;
        self.ctx.run_complete = false;
        self.fsm.tick(&mut self.ctx);
        self.apply_requests(io, now_ms);

        // 8. Counter
        if self.ctx.counted {
            let total = self.ctx.counters.total_done;
            if let Err(e) = store.save_count(total) {
                warn!("Counter persist failed: {e}");
            }
            sink.emit(&AppEvent::ObjectCounted {
                total_done: total,
                batch_count: self.ctx.counters.batch_count,
            });
        }
        if self.ctx.run_complete {
            sink.emit(&AppEvent::RunComplete {
                total_done: self.ctx.counters.total_done,
            });
        }

        // 9. Status
        self.finish_tick(prev_state, store, sink);
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply an operator command: reset, then calib, then auto.
    pub fn handle_command(
        &mut self,
        cmd: &Command,
        io: &mut impl DigitalIo,
        sink: &mut impl EventSink,
        now_ms: u64,
    ) {
        debug!("Command received: {cmd:?}");
        let mut applied_target = None;

        if cmd.reset {
            info!("Command: reset");
            self.ctx.counters.total_done = 0;
            self.ctx.counters.batch_count = 0;
            self.ctx.counters.target_set = false;
            self.pulses.clear();
            if let Err(e) = self.latch.force_all_low(io) {
                self.note_write_error(&e);
            }
            self.fsm.force_transition(StateId::Idle, &mut self.ctx);
        }

        if self.fsm.current_state() == StateId::Error {
            if cmd.calib || cmd.auto {
                warn!("Command ignored in ERROR; send reset first");
            }
        } else {
            if cmd.calib {
                info!("Command: calibration request");
                self.fsm.force_transition(StateId::Idle, &mut self.ctx);
                self.ctx.requests.pulse(OutputSignal::CalibrationRequest);
            }

            if cmd.auto {
                match cmd.target {
                    Some(target) => {
                        info!("Command: auto run, target {target}");
                        self.ctx.counters.target_n = target;
                        self.ctx.counters.total_done = 0;
                        self.ctx.counters.batch_count = 0;
                        self.ctx.counters.target_set = true;
                        self.fsm.force_transition(StateId::Starting, &mut self.ctx);
                        applied_target = Some(target);
                    }
                    None => debug!("Command: auto without a positive target ignored"),
                }
            }
        }

        self.apply_requests(io, now_ms);
        sink.emit(&AppEvent::CommandApplied {
            reset: cmd.reset,
            calib: cmd.calib,
            target: applied_target,
        });
    }

    // ── Auxiliary helpers ─────────────────────────────────────

    /// Poll the named input once per tick period until it reads
    /// `expected` or `timeout_ms` passes.  Read failures count as "not
    /// yet".
    ///
    /// Only for commissioning and manual checks; the control loop never
    /// calls this.
    pub fn wait_input(
        &self,
        io: &mut impl DigitalIo,
        clock: &impl Clock,
        name: &str,
        expected: bool,
        timeout_ms: u64,
    ) -> Result<bool, IoError> {
        let addr = self
            .io_map
            .input_by_name(name)
            .ok_or_else(|| IoError::UnmappedInput(name.to_string()))?;
        let poll_ms = u64::from(self.ctx.config.loop_ms);
        let deadline = clock.now_ms().saturating_add(timeout_ms);
        while clock.now_ms() < deadline {
            if io.read(addr).is_ok_and(|v| v == expected) {
                return Ok(true);
            }
            clock.sleep_ms(poll_ms);
        }
        Ok(false)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Snapshot of the published status record.
    pub fn status(&self) -> Status {
        Status {
            mode: self.fsm.current_state(),
            total_done: self.ctx.counters.total_done,
            batch_count: self.ctx.counters.batch_count,
            batch_size: self.ctx.config.batch_size,
            target_n: self.ctx.counters.target_n,
            error: self.error.clone(),
            ts: unix_secs(),
        }
    }

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn total_done(&self) -> u32 {
        self.ctx.counters.total_done
    }

    pub fn batch_count(&self) -> u32 {
        self.ctx.counters.batch_count
    }

    pub fn target_n(&self) -> u32 {
        self.ctx.counters.target_n
    }

    pub fn target_set(&self) -> bool {
        self.ctx.counters.target_set
    }

    /// Error text of the last tick (empty when healthy).
    pub fn last_error(&self) -> &str {
        &self.error
    }

    /// Last level written to `signal`, if mapped and ever written.
    pub fn output_state(&self, signal: OutputSignal) -> Option<bool> {
        self.latch.state(signal)
    }

    /// Whether a pulse on `signal` is waiting to be driven low.
    pub fn pulse_pending(&self, signal: OutputSignal) -> bool {
        self.pulses.is_pending(signal)
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Current active fault bitmask (0 = no faults).
    pub fn fault_flags(&self) -> u8 {
        self.safety.faults()
    }

    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn read_inputs(&self, io: &mut impl DigitalIo) -> Result<InputSnapshot, IoError> {
        let mut read = |signal: InputSignal| -> Result<bool, IoError> {
            let addr = self
                .io_map
                .input(signal)
                .ok_or_else(|| IoError::UnmappedInput(signal.name().to_string()))?;
            io.read(addr)
        };

        let start_button = read(InputSignal::StartButton)?;
        let object = read(InputSignal::Object)?;
        let ready = read(InputSignal::Ready)?;
        let next = read(InputSignal::Next)?;
        let robot_error = match self.io_map.input(InputSignal::RobotError) {
            Some(addr) => io.read(addr)?,
            None => false,
        };

        Ok(InputSnapshot {
            start_button,
            object,
            ready,
            next,
            robot_error,
        })
    }

    /// Translate FSM output requests into latch and scheduler calls.
    fn apply_requests(&mut self, io: &mut impl DigitalIo, now_ms: u64) {
        let requests = self.ctx.take_requests();
        if requests.is_empty() {
            return;
        }

        if requests.all_off {
            self.pulses.clear();
            if let Err(e) = self.latch.force_all_low(io) {
                self.note_write_error(&e);
            }
        }

        let width = self.ctx.config.pulse_ms;
        for signal in requests.pulses {
            if let Err(e) = self.pulses.fire(&mut self.latch, io, signal, width, now_ms) {
                self.note_write_error(&e);
            }
        }
    }

    fn note_write_error(&mut self, e: &IoError) {
        warn!("Output write failed: {e}");
        if self.error.is_empty() {
            self.error = format!("IO write error: {e}");
        }
    }

    /// Emit the state change (if any) and publish the status record.
    fn finish_tick(&mut self, prev_state: StateId, store: &mut impl Mailbox, sink: &mut impl EventSink) {
        let state = self.fsm.current_state();
        if state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: state,
            });
        }
        if state == StateId::Error && self.error.is_empty() {
            self.error = "ERROR state".to_string();
        }
        self.publish(store);
    }

    fn publish(&self, store: &mut impl Mailbox) {
        if let Err(e) = store.publish_status(&self.status()) {
            warn!("Status publish failed: {e}");
        }
    }
}
