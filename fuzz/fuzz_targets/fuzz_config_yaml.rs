//! Fuzz target: `SystemConfig::from_yaml`
//!
//! Invariants checked:
//! - No panics under any UTF-8 input
//! - An accepted config always resolves its I/O map and has a tick no
//!   longer than its pulse width
//!
//! cargo fuzz run fuzz_config_yaml

#![no_main]

use libfuzzer_sys::fuzz_target;
use pickmark::config::SystemConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = SystemConfig::from_yaml(text) {
        assert!(config.io_map().is_ok());
        assert!(config.loop_ms > 0 && config.loop_ms <= config.pulse_ms);
        assert!(config.batch_size > 0);
    }
});
