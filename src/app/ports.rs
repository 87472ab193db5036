//! Port traits — the hexagonal boundary between cycle logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (relay board, mailbox files, clock, log output)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! takes them as generics at each call site, so the cycle logic never
//! touches a process, a file, or the system clock directly.

use crate::error::{IoError, StoreError};
use crate::io_map::Address;

use super::commands::Command;
use super::events::{AppEvent, Status};

// ───────────────────────────────────────────────────────────────
// Digital I/O port (driven adapter: domain ↔ relay/input board)
// ───────────────────────────────────────────────────────────────

/// Raw read/write access to one physical channel.
///
/// Implementations may be slow (the production backend spawns a process
/// per call) but must not block indefinitely.
pub trait DigitalIo {
    /// Sample a digital input; `true` = 1.
    fn read(&mut self, addr: Address) -> Result<bool, IoError>;

    /// Drive a relay output.
    fn write(&mut self, addr: Address, on: bool) -> Result<(), IoError>;
}

// ───────────────────────────────────────────────────────────────
// Mailbox port (driven adapter: domain ↔ operator interface)
// ───────────────────────────────────────────────────────────────

/// One-shot command inbox plus latest-status outbox.
///
/// # Delivery
///
/// - `try_take_command` is consume-once: the record is removed as it is
///   read, parsed or not.  If removal fails the same record may be seen
///   again (at-least-once).
/// - `publish_status` must be atomic: a concurrent reader sees either the
///   previous document or the new one, never a torn write.
pub trait Mailbox {
    /// Take the pending command, if any.  Missing or malformed → `None`.
    fn try_take_command(&mut self) -> Option<Command>;

    /// Replace the published status document.
    fn publish_status(&mut self, status: &Status) -> Result<(), StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Counter store (driven adapter: domain ↔ durable counter)
// ───────────────────────────────────────────────────────────────

/// Durable raw production count, written on every increment and kept
/// apart from the status document.
pub trait CounterStore {
    /// Last persisted count, `0` when absent or unreadable.
    fn load_count(&self) -> u32;

    /// Persist `count` atomically.
    fn save_count(&mut self, count: u32) -> Result<(), StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock shared by the tick loop, debouncer,
/// pulse scheduler and heartbeat.
pub trait Clock {
    fn now_ms(&self) -> u64;

    /// Block the calling thread.  Test clocks override this to advance
    /// simulated time instead.
    fn sleep_ms(&self, ms: u64) {
        std::thread::sleep(std::time::Duration::from_millis(ms));
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
