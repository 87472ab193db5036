//! Logical signal names and their physical addresses on the relay board.
//!
//! Single source of truth for the names the cycle logic refers to.  The
//! configuration maps each name to a `(stack, channel)` pair once at
//! startup; after that the maps are immutable.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Physical address
// ---------------------------------------------------------------------------

/// A physical channel on a stacked relay/input board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    pub stack: u8,
    pub channel: u8,
}

impl Address {
    pub const fn new(stack: u8, channel: u8) -> Self {
        Self { stack, channel }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.stack, self.channel)
    }
}

/// How a channel is written in the config file: either a bare channel
/// number on the default stack, or an explicit `{stack, ch}` mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelSpec {
    Channel(u8),
    Addressed {
        #[serde(default)]
        stack: Option<u8>,
        ch: u8,
    },
}

impl ChannelSpec {
    pub fn resolve(self, default_stack: u8) -> Address {
        match self {
            Self::Channel(ch) => Address::new(default_stack, ch),
            Self::Addressed { stack, ch } => Address::new(stack.unwrap_or(default_stack), ch),
        }
    }
}

// ---------------------------------------------------------------------------
// Logical inputs
// ---------------------------------------------------------------------------

/// Inputs read from the board every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSignal {
    /// Physical start push-button.
    StartButton,
    /// One pulse per object leaving the magazine.
    Object,
    /// Robot ready for the next pick.
    Ready,
    /// Robot finished marking and pick-out of a batch.
    Next,
    /// Robot fault output (optional).
    RobotError,
}

impl InputSignal {
    pub const REQUIRED: [Self; 4] = [Self::StartButton, Self::Object, Self::Ready, Self::Next];

    pub const fn name(self) -> &'static str {
        match self {
            Self::StartButton => "btn_start",
            Self::Object => "object_signal",
            Self::Ready => "ready_signal",
            Self::Next => "next_signal",
            Self::RobotError => "r_error",
        }
    }
}

// ---------------------------------------------------------------------------
// Logical outputs
// ---------------------------------------------------------------------------

/// Outputs driven towards the robot controller.  Every one of them is
/// optional in the config; an unmapped output is a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputSignal {
    /// Move the robot to its ready pose.
    Start,
    /// Pick two more objects.
    Continue,
    /// Batch complete, run the marking cycle.
    Over,
    /// Target count reached.
    CountOk,
    /// Request a calibration routine.
    CalibrationRequest,
    /// Liveness toggle for external monitors.
    Heartbeat,
}

impl OutputSignal {
    pub const ALL: [Self; 6] = [
        Self::Start,
        Self::Continue,
        Self::Over,
        Self::CountOk,
        Self::CalibrationRequest,
        Self::Heartbeat,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "start_signal",
            Self::Continue => "continue_signal",
            Self::Over => "over_signal",
            Self::CountOk => "count_ok",
            Self::CalibrationRequest => "r_calib_req",
            Self::Heartbeat => "pi_alive",
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved maps
// ---------------------------------------------------------------------------

/// Name → address maps, resolved once from config.
#[derive(Debug, Clone, Default)]
pub struct IoMap {
    inputs: BTreeMap<String, Address>,
    outputs: BTreeMap<String, Address>,
}

impl IoMap {
    /// Resolve the raw config maps.  Fails if a required input is absent.
    pub fn resolve(
        inputs: &BTreeMap<String, ChannelSpec>,
        outputs: &BTreeMap<String, ChannelSpec>,
        default_stack: u8,
    ) -> Result<Self, ConfigError> {
        for required in InputSignal::REQUIRED {
            if !inputs.contains_key(required.name()) {
                return Err(ConfigError::MissingInput(required.name()));
            }
        }
        Ok(Self {
            inputs: inputs
                .iter()
                .map(|(k, v)| (k.clone(), v.resolve(default_stack)))
                .collect(),
            outputs: outputs
                .iter()
                .map(|(k, v)| (k.clone(), v.resolve(default_stack)))
                .collect(),
        })
    }

    pub fn input(&self, signal: InputSignal) -> Option<Address> {
        self.inputs.get(signal.name()).copied()
    }

    pub fn input_by_name(&self, name: &str) -> Option<Address> {
        self.inputs.get(name).copied()
    }

    pub fn output(&self, signal: OutputSignal) -> Option<Address> {
        self.outputs.get(signal.name()).copied()
    }

    /// Every configured output address, including names the cycle never
    /// pulses (they are still forced low on fault and shutdown).
    pub fn output_addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.outputs.values().copied()
    }
}
