//! PickMark cell controller library.
//!
//! Exposes the pure-logic modules for integration testing and the
//! adapters the binary wires together.  Nothing here owns a thread or a
//! global apart from the shutdown flag.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod fsm;
pub mod io_map;
pub mod safety;
pub mod scheduler;
pub mod shutdown;

mod error;

pub use error::{ConfigError, Error, IoError, Result, SafetyFault, StoreError};
