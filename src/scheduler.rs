//! Pulse scheduler.
//!
//! Handshake outputs are pulses: set high now, driven low again once a
//! fixed width has elapsed.  The scheduler records one absolute expiry per
//! logical output and is serviced at the top of every control tick, so an
//! output stays high at least its nominal width and at most one tick
//! longer.
//!
//! ```text
//!   fire(over, 150)            service(now ≥ expiry)
//!        │                            │
//!        ▼                            ▼
//!   ┌─────────┐   pending: {over → t+150}   ┌─────────┐
//!   │ latch ↑ │ ──────────────────────────▶ │ latch ↓ │ ─▶ entry removed
//!   └─────────┘                             └─────────┘
//! ```
//!
//! Firing an output that is already pending restarts its pulse; pulses
//! never stack.

use std::collections::HashMap;

use log::{debug, warn};

use crate::app::ports::DigitalIo;
use crate::drivers::latch::OutputLatch;
use crate::error::IoError;
use crate::io_map::OutputSignal;

#[derive(Debug, Default)]
pub struct PulseScheduler {
    /// Output → absolute expiry (ms on the loop clock).
    pending: HashMap<OutputSignal, u64>,
}

impl PulseScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `signal` high and schedule its return to low.
    ///
    /// Unmapped outputs are ignored.  If the rising write fails nothing is
    /// scheduled and the error is returned.
    pub fn fire(
        &mut self,
        latch: &mut OutputLatch,
        io: &mut impl DigitalIo,
        signal: OutputSignal,
        duration_ms: u32,
        now_ms: u64,
    ) -> Result<(), IoError> {
        if !latch.is_mapped(signal) {
            return Ok(());
        }
        latch.set(io, signal, true)?;
        let expiry = now_ms + u64::from(duration_ms);
        debug!("Pulse: {} until {expiry}", signal.name());
        self.pending.insert(signal, expiry);
        Ok(())
    }

    /// Drive every expired pulse low.
    ///
    /// An entry is removed only once its output has been driven low; a
    /// failed write leaves it pending for the next tick.  Returns the
    /// first write error.
    pub fn service(
        &mut self,
        latch: &mut OutputLatch,
        io: &mut impl DigitalIo,
        now_ms: u64,
    ) -> Result<(), IoError> {
        let mut due: Vec<OutputSignal> = self
            .pending
            .iter()
            .filter(|&(_, &expiry)| now_ms >= expiry)
            .map(|(&signal, _)| signal)
            .collect();
        due.sort_unstable();

        let mut first_err = None;
        for signal in due {
            match latch.set(io, signal, false) {
                Ok(()) => {
                    self.pending.remove(&signal);
                }
                Err(e) => {
                    warn!("Pulse: failed to end {}: {e}", signal.name());
                    first_err.get_or_insert(e);
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Forget every pending pulse (outputs are left as they are).
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, signal: OutputSignal) -> bool {
        self.pending.contains_key(&signal)
    }

    #[cfg(test)]
    pub fn expiry(&self, signal: OutputSignal) -> Option<u64> {
        self.pending.get(&signal).copied()
    }
}
