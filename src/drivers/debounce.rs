//! Debounced rising-edge detector for the object sensor.
//!
//! The sensor is polled at control-tick rate; there is no interrupt.  A
//! sample counts as an object only on a 0→1 transition that lands at
//! least `debounce_ms` after the previously accepted edge.  The last raw
//! level is tracked on every call, so a level held high across many ticks
//! is a single edge.

/// Rising-edge detector with a minimum gap between accepted edges.
#[derive(Debug, Clone)]
pub struct EdgeDetector {
    debounce_ms: u64,
    last_value: bool,
    /// `None` until the first edge is accepted.
    last_edge_ms: Option<u64>,
}

impl EdgeDetector {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            debounce_ms: u64::from(debounce_ms),
            last_value: false,
            last_edge_ms: None,
        }
    }

    /// Feed one raw sample.  Returns `true` when it is an accepted edge.
    pub fn detect(&mut self, raw: bool, now_ms: u64) -> bool {
        let rising = raw && !self.last_value;
        self.last_value = raw;

        if !rising {
            return false;
        }

        let gap_ok = self
            .last_edge_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.debounce_ms);
        if gap_ok {
            self.last_edge_ms = Some(now_ms);
        }
        gap_ok
    }

    /// Last raw level seen.
    #[cfg(test)]
    pub fn level(&self) -> bool {
        self.last_value
    }
}
