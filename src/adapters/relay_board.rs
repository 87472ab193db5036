//! Relay/input HAT adapter.
//!
//! Implements [`DigitalIo`] by shelling out to the vendor's `4rel4in`
//! command-line tool, one process per read or write.
//!
//! Firmware revisions of the tool disagree on sub-command names, so each
//! operation carries an ordered list of dialects.  They are tried in
//! order; the first one that exits cleanly (and, for reads, prints a
//! 0/1 level) wins:
//!
//! | Operation | Dialects (in order)                 | Arguments           |
//! |-----------|-------------------------------------|---------------------|
//! | read      | `in`, `din`, `readin`, `inrd`       | `stack ch`          |
//! | write     | `relwr`, `rel`, `r`, `write`        | `stack ch on\|off`  |
//!
//! Nothing is cached between calls; a board swapped at runtime is picked
//! up on the next operation.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use crate::app::ports::DigitalIo;
use crate::error::IoError;
use crate::io_map::Address;

/// Tool name looked up on `PATH`.
pub const CLI_NAME: &str = "4rel4in";
/// Fallback when the tool is not on `PATH`.
pub const DEFAULT_CLI_PATH: &str = "/usr/local/bin/4rel4in";

const READ_DIALECTS: [&str; 4] = ["in", "din", "readin", "inrd"];
const WRITE_DIALECTS: [&str; 4] = ["relwr", "rel", "r", "write"];

// ───────────────────────────────────────────────────────────────
// Shell seam
// ───────────────────────────────────────────────────────────────

/// Runs one external command and returns its trimmed stdout.
///
/// A non-zero exit or spawn failure is an `Err` carrying a short reason.
pub trait Shell {
    fn run(&mut self, program: &Path, args: &[String]) -> Result<String, String>;
}

/// Real process execution, optionally through `sudo -n`.
pub struct SystemShell {
    use_sudo: bool,
}

impl SystemShell {
    pub fn new(use_sudo: bool) -> Self {
        Self { use_sudo }
    }
}

impl Shell for SystemShell {
    fn run(&mut self, program: &Path, args: &[String]) -> Result<String, String> {
        let mut cmd = if self.use_sudo {
            let mut c = Command::new("sudo");
            c.arg("-n").arg(program);
            c
        } else {
            Command::new(program)
        };
        cmd.args(args);

        // The vendor installer drops the tool into /usr/local/bin, which
        // is missing from PATH under some service managers.
        let path = std::env::var("PATH").unwrap_or_default();
        cmd.env("PATH", format!("{path}:/usr/local/bin"));

        let output = cmd.output().map_err(|e| format!("spawn {}: {e}", program.display()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("{} ({})", output.status, stderr.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

// ───────────────────────────────────────────────────────────────
// RelayCli
// ───────────────────────────────────────────────────────────────

/// [`DigitalIo`] backed by the `4rel4in` CLI.
pub struct RelayCli<S: Shell = SystemShell> {
    program: PathBuf,
    shell: S,
}

impl RelayCli<SystemShell> {
    /// Resolve the tool path: explicit path, then `PATH`, then
    /// [`DEFAULT_CLI_PATH`].
    pub fn new(explicit: Option<PathBuf>, use_sudo: bool) -> Self {
        let program = explicit
            .or_else(|| which::which(CLI_NAME).ok())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CLI_PATH));
        info!(
            "Relay board CLI: {}{}",
            program.display(),
            if use_sudo { " (via sudo -n)" } else { "" }
        );
        Self::with_shell(program, SystemShell::new(use_sudo))
    }
}

impl<S: Shell> RelayCli<S> {
    pub fn with_shell(program: PathBuf, shell: S) -> Self {
        Self { program, shell }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Try each dialect in order.  The first clean exit whose output
    /// `accept` turns into a value wins; a rejected output counts as a
    /// failed dialect.
    fn try_dialects<T>(
        &mut self,
        op: &'static str,
        dialects: &[&str],
        tail: &[String],
        accept: impl Fn(&str) -> Result<T, IoError>,
    ) -> Result<T, IoError> {
        let mut last = String::from("no dialect attempted");
        for dialect in dialects {
            let mut args = Vec::with_capacity(tail.len() + 1);
            args.push((*dialect).to_string());
            args.extend_from_slice(tail);
            let attempt = self
                .shell
                .run(&self.program, &args)
                .and_then(|out| accept(&out).map_err(|e| e.to_string()));
            match attempt {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!("{CLI_NAME} {dialect}: {e}");
                    last = e;
                }
            }
        }
        Err(IoError::Unavailable { op, last })
    }
}

impl<S: Shell> DigitalIo for RelayCli<S> {
    fn read(&mut self, addr: Address) -> Result<bool, IoError> {
        let tail = [addr.stack.to_string(), addr.channel.to_string()];
        self.try_dialects("read", &READ_DIALECTS, &tail, parse_level)
    }

    fn write(&mut self, addr: Address, on: bool) -> Result<(), IoError> {
        let state = if on { "on" } else { "off" };
        let tail = [
            addr.stack.to_string(),
            addr.channel.to_string(),
            state.to_string(),
        ];
        self.try_dialects("write", &WRITE_DIALECTS, &tail, |_| Ok(()))
    }
}

/// Interpret a read reply.
///
/// Some tool versions print a label before the value, so a trailing `0`
/// or `1` decides; otherwise the whole reply must be the integer 0 or 1.
fn parse_level(out: &str) -> Result<bool, IoError> {
    let out = out.trim();
    match out.chars().last() {
        Some('1') => Ok(true),
        Some('0') => Ok(false),
        _ => match out.parse::<i64>() {
            Ok(0) => Ok(false),
            Ok(1) => Ok(true),
            _ => Err(IoError::Unparseable(out.to_string())),
        },
    }
}
