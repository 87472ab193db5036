//! Hardware-facing helpers that sit between the cycle logic and the
//! [`DigitalIo`](crate::app::ports::DigitalIo) port.
//!
//! | Module      | Concern                                     |
//! |-------------|---------------------------------------------|
//! | `debounce`  | Object-sensor rising edges                  |
//! | `latch`     | Output write deduplication                  |
//! | `heartbeat` | Periodic liveness toggle                    |

pub mod debounce;
pub mod heartbeat;
pub mod latch;
