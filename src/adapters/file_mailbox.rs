//! File-based mailbox adapter.
//!
//! Implements [`Mailbox`] and [`CounterStore`] over three JSON files in
//! one directory, shared with the operator page:
//!
//! | File                 | Writer     | Reader     | Discipline            |
//! |----------------------|------------|------------|-----------------------|
//! | `hmi_cmd.json`       | operator   | controller | read, then delete     |
//! | `runtime_state.json` | controller | operator   | temp file + rename    |
//! | `pick_counter.json`  | controller | controller | temp file + rename    |

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::app::commands::Command;
use crate::app::events::{unix_secs, Status};
use crate::app::ports::{CounterStore, Mailbox};
use crate::error::StoreError;

use super::utils::atomic_write;

pub const COMMAND_FILE: &str = "hmi_cmd.json";
pub const STATUS_FILE: &str = "runtime_state.json";
pub const COUNTER_FILE: &str = "pick_counter.json";

/// On-disk shape of the counter file.
#[derive(Debug, Serialize, Deserialize)]
struct CounterRecord {
    #[serde(default)]
    count: u32,
    #[serde(default)]
    ts: f64,
}

pub struct FileMailbox {
    dir: PathBuf,
}

impl FileMailbox {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn command_path(&self) -> PathBuf {
        self.dir.join(COMMAND_FILE)
    }

    pub fn status_path(&self) -> PathBuf {
        self.dir.join(STATUS_FILE)
    }

    pub fn counter_path(&self) -> PathBuf {
        self.dir.join(COUNTER_FILE)
    }
}

impl Mailbox for FileMailbox {
    fn try_take_command(&mut self) -> Option<Command> {
        let path = self.command_path();
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Mailbox: cannot read {}: {e}", path.display());
                return None;
            }
        };

        // Consume before parsing so a bad record is not retried forever.
        if let Err(e) = std::fs::remove_file(&path) {
            warn!("Mailbox: cannot delete {}: {e}", path.display());
        }

        let cmd = Command::parse(&bytes);
        if cmd.is_none() {
            debug!("Mailbox: discarded malformed command ({} bytes)", bytes.len());
        }
        cmd
    }

    fn publish_status(&mut self, status: &Status) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(status)?;
        atomic_write(&self.status_path(), &json)?;
        Ok(())
    }
}

impl CounterStore for FileMailbox {
    fn load_count(&self) -> u32 {
        std::fs::read(self.counter_path())
            .ok()
            .and_then(|b| serde_json::from_slice::<CounterRecord>(&b).ok())
            .map_or(0, |r| r.count)
    }

    fn save_count(&mut self, count: u32) -> Result<(), StoreError> {
        let record = CounterRecord {
            count,
            ts: unix_secs(),
        };
        atomic_write(&self.counter_path(), &serde_json::to_vec(&record)?)?;
        Ok(())
    }
}
