//! Cooperative shutdown on SIGINT / SIGTERM.
//!
//! The handler only stores into an atomic; the control loop checks
//! [`requested`] once per tick and winds down between ticks.

use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

extern "C" fn on_signal(_signum: libc::c_int) {
    SHUTDOWN.store(true, Ordering::Release);
}

/// Register the handler for SIGINT and SIGTERM.
pub fn install() {
    let handler = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
    for sig in [libc::SIGINT, libc::SIGTERM] {
        // SAFETY: the handler only performs an atomic store, which is
        // async-signal-safe.
        let prev = unsafe { libc::signal(sig, handler) };
        if prev == libc::SIG_ERR {
            warn!("Failed to install handler for signal {sig}");
        }
    }
}

/// Whether a termination signal has arrived.
pub fn requested() -> bool {
    SHUTDOWN.load(Ordering::Acquire)
}

/// Ask the loop to stop, as a signal would.
pub fn request() {
    SHUTDOWN.store(true, Ordering::Release);
}
