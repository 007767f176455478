//! Logging setup
//!
//! | level    | log file | stderr |
//! |----------|----------|--------|
//! | `off`    | -        | -      |
//! | `logged` | INFO     | ERROR  |
//! | `debug`  | INFO     | DEBUG  |
//!
//! `KNOWLEDGE_LOG` (EnvFilter syntax) replaces the stderr filter. Events
//! under [`FAILURE_TARGET`] only ever reach the log file.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Overrides the stderr filter
pub const LOG_ENV: &str = "KNOWLEDGE_LOG";

/// Target for failures that are reported on stderr by other means
pub const FAILURE_TARGET: &str = "knowledge::failure";

/// Logging verbosity / behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DebugLevel {
    /// No logging at all
    Off,
    /// Log to file, only errors on the console
    #[default]
    Logged,
    /// Log to file and debug output on the console
    Debug,
}

impl DebugLevel {
    fn console_default(self) -> LevelFilter {
        match self {
            DebugLevel::Off => LevelFilter::OFF,
            DebugLevel::Logged => LevelFilter::ERROR,
            DebugLevel::Debug => LevelFilter::DEBUG,
        }
    }
}

/// Install the global subscriber for this invocation
pub fn init(level: DebugLevel, logfile: &Path) -> Result<()> {
    if level == DebugLevel::Off {
        return Ok(());
    }

    if let Some(parent) = logfile.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(logfile)
        .with_context(|| format!("Failed to open log file {}", logfile.display()))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(LevelFilter::INFO);

    let console_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.console_default().into()))
        .add_directive(
            format!("{}=off", FAILURE_TARGET)
                .parse()
                .context("Invalid failure log directive")?,
        );
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_file(true)
        .with_line_number(true)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install log subscriber")?;
    Ok(())
}
