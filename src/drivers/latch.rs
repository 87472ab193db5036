//! Write-deduplicating output latch.
//!
//! Keeps the last value successfully written to every output address and
//! skips the physical write when the requested level already matches.
//! The cache is what we last told the board, not a read-back.
//!
//! A failed write leaves the cache untouched, so the next `set` with the
//! same value tries again.

use std::collections::HashMap;

use log::{debug, warn};

use crate::app::ports::DigitalIo;
use crate::error::IoError;
use crate::io_map::{Address, IoMap, OutputSignal};

pub struct OutputLatch {
    map: IoMap,
    cache: HashMap<Address, bool>,
}

impl OutputLatch {
    pub fn new(map: IoMap) -> Self {
        Self {
            map,
            cache: HashMap::new(),
        }
    }

    /// Drive `signal` to `value`.  Unmapped outputs are a silent no-op.
    pub fn set(
        &mut self,
        io: &mut impl DigitalIo,
        signal: OutputSignal,
        value: bool,
    ) -> Result<(), IoError> {
        let Some(addr) = self.map.output(signal) else {
            return Ok(());
        };
        self.write(io, addr, value)
    }

    /// Last level written for `signal`; `None` if unmapped or never written.
    pub fn state(&self, signal: OutputSignal) -> Option<bool> {
        self.map
            .output(signal)
            .and_then(|addr| self.cache.get(&addr).copied())
    }

    pub fn is_mapped(&self, signal: OutputSignal) -> bool {
        self.map.output(signal).is_some()
    }

    /// Drive every configured output low.
    ///
    /// Every address is attempted even after a failure; the first error
    /// is returned.
    pub fn force_all_low(&mut self, io: &mut impl DigitalIo) -> Result<(), IoError> {
        let addrs: Vec<Address> = self.map.output_addresses().collect();
        let mut first_err = None;
        for addr in addrs {
            if let Err(e) = self.write(io, addr, false) {
                warn!("Latch: failed to drive {addr} low: {e}");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn write(&mut self, io: &mut impl DigitalIo, addr: Address, value: bool) -> Result<(), IoError> {
        if self.cache.get(&addr) == Some(&value) {
            return Ok(());
        }
        io.write(addr, value)?;
        debug!("Latch: {addr} <- {}", u8::from(value));
        self.cache.insert(addr, value);
        Ok(())
    }
}
