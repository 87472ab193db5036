//! Fuzz target: `Command::parse` (operator mailbox input)
//!
//! The command file is written by another process and may be truncated,
//! empty or garbage.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - A parsed `target` is always positive
//!
//! cargo fuzz run fuzz_command_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use pickmark::app::commands::Command;

fuzz_target!(|data: &[u8]| {
    if let Some(cmd) = Command::parse(data) {
        if let Some(target) = cmd.target {
            assert!(target > 0, "parsed a non-positive target: {target}");
        }
    }
});
