//! Application core — cycle logic behind port traits.
//!
//! This module contains the business rules for the pick-place-mark cell:
//! tick orchestration, command application, counting and status
//! publication.  All interaction with the board, the mailbox files and
//! the clock happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
