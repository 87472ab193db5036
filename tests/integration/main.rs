//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the controller against
//! mock adapters.  No relay board or mailbox directory is required.

mod command_tests;
mod mailbox_tests;
mod mock_hw;
