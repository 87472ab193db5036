//! Liveness heartbeat timer.
//!
//! Fires once every time more than `period_ms` has passed since the last
//! firing, so an external monitor can tell the control loop is still
//! running.  Keyed off the same clock the loop ticks with; the service
//! calls [`Heartbeat::due`] once per tick and inverts `pi_alive` from its
//! last written level when it fires.

pub struct Heartbeat {
    period_ms: u64,
    last_toggle_ms: u64,
}

impl Heartbeat {
    pub fn new(period_ms: u32, now_ms: u64) -> Self {
        Self {
            period_ms: u64::from(period_ms),
            last_toggle_ms: now_ms,
        }
    }

    /// `true` when a toggle is due; re-arms the timer.
    pub fn due(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_toggle_ms) <= self.period_ms {
            return false;
        }
        self.last_toggle_ms = now_ms;
        true
    }
}
