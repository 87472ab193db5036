//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  It holds the latest input snapshot, the debounced object
//! edge for this tick, the run counters, the output actions requested by
//! handlers, and configuration.  Handlers never touch the board; the
//! [`AppService`](crate::app::service::AppService) applies the requested
//! actions after each FSM call.

use crate::config::SystemConfig;
use crate::io_map::OutputSignal;

// ---------------------------------------------------------------------------
// Input snapshot (read-only to state handlers; written by the service)
// ---------------------------------------------------------------------------

/// One sample of every input the cycle looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub start_button: bool,
    /// Raw object sensor level (edges come through `FsmContext::object_edge`).
    pub object: bool,
    pub ready: bool,
    pub next: bool,
    /// Always `false` when `r_error` is not mapped.
    pub robot_error: bool,
}

// ---------------------------------------------------------------------------
// Run counters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    /// Objects processed in the current run.
    pub total_done: u32,
    /// Objects in the open batch, `0..=batch_size`.
    pub batch_count: u32,
    /// Requested total for the run.
    pub target_n: u32,
    /// Whether a valid target has been armed.
    pub target_set: bool,
}

impl Counters {
    pub fn new(target_default: u32) -> Self {
        Self {
            total_done: 0,
            batch_count: 0,
            target_n: target_default,
            target_set: false,
        }
    }

    pub fn target_reached(&self) -> bool {
        self.total_done >= self.target_n
    }
}

// ---------------------------------------------------------------------------
// Output requests (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// Output actions requested during one FSM call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRequests {
    /// Outputs to pulse, in request order.
    pub pulses: Vec<OutputSignal>,
    /// Drive every configured output low and drop pending pulses.
    pub all_off: bool,
}

impl OutputRequests {
    pub fn pulse(&mut self, signal: OutputSignal) {
        self.pulses.push(signal);
    }

    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty() && !self.all_off
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Inputs --
    pub inputs: InputSnapshot,
    /// A debounced rising edge of the object sensor was seen this tick.
    pub object_edge: bool,

    // -- Run state --
    pub counters: Counters,

    // -- Outputs --
    pub requests: OutputRequests,

    // -- Configuration --
    pub config: SystemConfig,

    // -- Per-tick notes for the service --
    /// An object was counted this tick (counter must be persisted).
    pub counted: bool,
    /// The run finished this tick.
    pub run_complete: bool,
}

impl FsmContext {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            inputs: InputSnapshot::default(),
            object_edge: false,
            counters: Counters::new(config.target_default),
            requests: OutputRequests::default(),
            config,
            counted: false,
            run_complete: false,
        }
    }

    /// Take the pending output requests, leaving none behind.
    pub fn take_requests(&mut self) -> OutputRequests {
        std::mem::take(&mut self.requests)
    }
}
