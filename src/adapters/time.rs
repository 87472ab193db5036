//! Monotonic clock adapter.
//!
//! Milliseconds since the adapter was created, from
//! `std::time::Instant`.  Wall-clock jumps (NTP, manual `date`) do not
//! disturb the tick loop, debounce window or pulse widths.

use std::time::Instant;

use crate::app::ports::Clock;

pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
