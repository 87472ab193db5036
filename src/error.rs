//! Unified error types for the cell controller.
//!
//! One enum per subsystem, funnelled into a top-level [`Error`] so the
//! startup path in `main` has a single thing to report.  Runtime paths in
//! the control loop never escalate these past a log line and the status
//! record's `error` field.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] IoError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("store: {0}")]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Digital I/O backend errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IoError {
    /// Every known command dialect failed; carries the last failure.
    #[error("relay board not responding to any {op} dialect (last: {last})")]
    Unavailable { op: &'static str, last: String },

    /// The board answered but the reply was not a 0/1 reading.
    #[error("unparseable input reading {0:?}")]
    Unparseable(String),

    /// A logical input name has no physical address.
    #[error("input '{0}' is not mapped")]
    UnmappedInput(String),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("required input '{0}' missing from the input map")]
    MissingInput(&'static str),

    #[error("validation failed: {0}")]
    ValidationFailed(&'static str),
}

// ---------------------------------------------------------------------------
// Mailbox / counter store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Fs(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Safety faults
// ---------------------------------------------------------------------------

/// Conditions that force the cycle into ERROR with every output low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyFault {
    /// The robot controller asserted its error output.
    RobotError,
}

impl SafetyFault {
    /// Bit in the supervisor's fault mask.
    pub const fn mask(self) -> u8 {
        match self {
            Self::RobotError => 1 << 0,
        }
    }
}

impl std::fmt::Display for SafetyFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RobotError => write!(f, "robot error input asserted"),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, Error>;
