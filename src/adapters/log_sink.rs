//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (routed to stderr by the binary's subscriber).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={state:?}");
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {from:?} -> {to:?}");
            }
            AppEvent::ObjectCounted {
                total_done,
                batch_count,
            } => {
                info!("COUNT | total={total_done} batch={batch_count}");
            }
            AppEvent::CommandApplied {
                reset,
                calib,
                target,
            } => {
                info!("CMD   | reset={reset} calib={calib} target={target:?}");
            }
            AppEvent::FaultDetected(fault) => {
                warn!("FAULT | detected: {fault}");
            }
            AppEvent::FaultCleared => {
                info!("FAULT | input cleared, waiting for reset");
            }
            AppEvent::RunComplete { total_done } => {
                info!("DONE  | run complete, total={total_done}");
            }
        }
    }
}
