//! Inbound operator commands.
//!
//! The operator page drops a JSON record into the mailbox; the
//! [`AppService`](super::service::AppService) applies it once, at the
//! start of a tick, in the fixed order reset → calib → auto.

use serde::Deserialize;
use serde_json::Value;

/// A parsed operator command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Command {
    /// Arm `target` and start a run.
    pub auto: bool,
    /// Requested total; `None` when absent, non-positive or unparsable.
    pub target: Option<u32>,
    /// Abort everything, zero counters, disarm the target.
    pub reset: bool,
    /// Pulse the calibration request and return to idle.
    pub calib: bool,
    /// Producer timestamp (Unix seconds), informational only.
    pub ts: Option<f64>,
}

/// Wire shape of the command file.  Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCommand {
    auto: bool,
    target: Option<Value>,
    reset: bool,
    calib: bool,
    ts: Option<f64>,
}

impl Command {
    /// Parse a command document.  Returns `None` for anything that is not
    /// a JSON object with the expected field types.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let raw: RawCommand = serde_json::from_slice(bytes).ok()?;
        Some(Self {
            auto: raw.auto,
            target: raw.target.as_ref().and_then(positive_target),
            reset: raw.reset,
            calib: raw.calib,
            ts: raw.ts,
        })
    }

    /// Convenience constructor for an arm-and-start command.
    pub fn auto(target: u32) -> Self {
        Self {
            auto: true,
            target: Some(target),
            ..Self::default()
        }
    }

    pub fn reset() -> Self {
        Self {
            reset: true,
            ..Self::default()
        }
    }

    pub fn calib() -> Self {
        Self {
            calib: true,
            ..Self::default()
        }
    }
}

/// Accept integers, floats (truncated) and numeric strings; reject the rest.
fn positive_target(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))?,
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))?
        }
        _ => return None,
    };
    u32::try_from(n).ok().filter(|&n| n > 0)
}
