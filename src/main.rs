//! PickMark — Main Entry Point
//!
//! Hexagonal architecture with a fixed-period polling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  RelayCli         FileMailbox          LogEventSink  Monotonic │
//! │  (DigitalIo)      (Mailbox+Counter)    (EventSink)   (Clock)   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  FSM · Safety · Latch · Pulses · Debounce              │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use tracing_subscriber::EnvFilter;

use pickmark::adapters::file_mailbox::FileMailbox;
use pickmark::adapters::log_sink::LogEventSink;
use pickmark::adapters::relay_board::RelayCli;
use pickmark::adapters::time::MonotonicClock;
use pickmark::app::ports::Clock;
use pickmark::app::service::AppService;
use pickmark::config::SystemConfig;
use pickmark::shutdown;

#[derive(Parser)]
#[command(name = "pickmark", about = "Pick-place-mark cell controller", version)]
struct Args {
    /// YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Directory holding the command, status and counter files
    /// [default: the config file's directory]
    #[arg(short, long, env = "PICKMARK_DIR")]
    dir: Option<PathBuf>,

    /// Run the relay-board CLI through `sudo -n`
    #[arg(long, env = "PICKMARK_USE_SUDO")]
    use_sudo: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn mailbox_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| match self.config.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        })
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Load configuration and build the service.  Only this stage may end
/// the process with an error.
fn bootstrap(args: &Args) -> pickmark::Result<(SystemConfig, AppService)> {
    info!("Loading config from {}", args.config.display());
    let config = SystemConfig::load(&args.config)?;
    let app = AppService::new(config.clone())?;
    Ok((config, app))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    info!("PickMark v{} starting", env!("CARGO_PKG_VERSION"));

    let (config, mut app) = bootstrap(&args).context("startup failed")?;
    info!(
        "Tick {} ms, debounce {} ms, pulse {} ms, batch {}, default target {}",
        config.loop_ms,
        config.debounce_obj_ms,
        config.pulse_ms,
        config.batch_size,
        config.target_default
    );

    // ── Adapters ──────────────────────────────────────────────
    let mut board = RelayCli::new(config.relay_cli.clone(), args.use_sudo);
    let mut mailbox = FileMailbox::new(args.mailbox_dir());
    let mut sink = LogEventSink::new();
    let clock = MonotonicClock::new();

    shutdown::install();

    app.start(&mut board, &mut mailbox, &mut sink, clock.now_ms());
    info!("Mailbox directory: {}", mailbox.dir().display());

    // ── Main loop ─────────────────────────────────────────────
    let period = u64::from(config.loop_ms);
    while !shutdown::requested() {
        let started = clock.now_ms();
        app.tick(&mut board, &mut mailbox, &mut sink, started);

        let elapsed = clock.now_ms().saturating_sub(started);
        if elapsed < period {
            clock.sleep_ms(period - elapsed);
        } else {
            debug!("Tick overran: {elapsed} ms > {period} ms");
        }
    }

    info!("Shutdown requested");
    app.shutdown(&mut board, &mut mailbox);
    info!("Stopped after {} ticks", app.tick_count());
    Ok(())
}
