//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                  |
//! |----------------|--------------------|------------------------------|
//! | `relay_board`  | DigitalIo          | `4rel4in` relay/input CLI    |
//! | `file_mailbox` | Mailbox            | Command/status JSON files    |
//! |                | CounterStore       | Counter JSON file            |
//! | `log_sink`     | EventSink          | `log` facade                 |
//! | `time`         | Clock              | `std::time::Instant`         |

pub mod file_mailbox;
pub mod log_sink;
pub mod relay_board;
pub mod time;
pub(super) mod utils;
