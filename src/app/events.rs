//! Outbound application events and the published status record.
//!
//! The [`AppService`](super::service::AppService) emits [`AppEvent`]s
//! through the [`EventSink`](super::ports::EventSink) port and publishes a
//! [`Status`] through the [`Mailbox`](super::ports::Mailbox) after every
//! tick.

use serde::{Deserialize, Serialize};

use crate::fsm::StateId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// A debounced object edge was counted.
    ObjectCounted { total_done: u32, batch_count: u32 },

    /// An operator command was applied.
    CommandApplied { reset: bool, calib: bool, target: Option<u32> },

    /// A safety fault forced every output low.
    FaultDetected(crate::error::SafetyFault),

    /// The fault input returned low (ERROR still waits for a reset).
    FaultCleared,

    /// The armed target was reached and `count_ok` pulsed.
    RunComplete { total_done: u32 },
}

/// The status document the operator page polls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub mode: StateId,
    pub total_done: u32,
    pub batch_count: u32,
    pub batch_size: u32,
    pub target_n: u32,
    /// Fault or I/O problem seen this tick; empty when healthy.
    pub error: String,
    /// Unix seconds.
    pub ts: f64,
}

/// Wall-clock Unix time in seconds, as stamped on every persisted record.
#[allow(clippy::cast_precision_loss)]
pub fn unix_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
