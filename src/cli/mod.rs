//! CLI module - Command definitions and handlers
//!
//! Every positional word is part of the query. Setup is managed through
//! `--init`, `--config` and `--stats`, so no query word can be mistaken
//! for a command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser};

use crate::config::Config;
use crate::logging::DebugLevel;

pub mod ask;
pub mod config;
pub mod init;
pub mod stats;

/// knowledge - Personal knowledge retrieval CLI
///
/// Ask a free-text question and get the best matching fact back, or run
/// the best matching tool.
#[derive(Parser, Debug)]
#[command(name = "knowledge")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("action")
        .args(["init", "stats", "config", "config_path"])
        .conflicts_with_all(["query", "tool", "vote_query"])
))]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub init: init::InitArgs,

    #[command(flatten)]
    pub config: config::ConfigArgs,

    #[command(flatten)]
    pub stats: stats::StatsArgs,

    #[command(flatten)]
    pub ask: ask::AskArgs,
}

/// Options shared by every action
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Additional configuration files, layered over the default one
    #[arg(short = 'c', long, value_name = "FILE")]
    pub configuration: Vec<PathBuf>,

    /// Logging verbosity / behavior
    #[arg(short, long, value_enum, default_value_t = DebugLevel::Logged)]
    pub debug: DebugLevel,

    /// Log file location (default: ~/.knowledge/knowledge.log)
    #[arg(short, long, value_name = "FILE")]
    pub logfile: Option<PathBuf>,

    /// Print the directory to add to PATH and exit
    #[arg(long)]
    pub show_path: bool,
}

impl GlobalArgs {
    /// Default config followed by any `--configuration` files
    pub fn config_paths(&self) -> Vec<PathBuf> {
        std::iter::once(Config::default_path())
            .chain(self.configuration.iter().cloned())
            .collect()
    }

    pub fn logfile(&self) -> PathBuf {
        self.logfile.clone().unwrap_or_else(Config::default_logfile)
    }

    pub fn load_config(&self) -> Result<Config> {
        Config::load(&self.config_paths())
    }
}

/// The one thing an invocation does
#[derive(Debug)]
pub enum Action {
    /// Vote on the query words
    Ask(ask::AskArgs),

    /// Write the default configuration and knowledge source
    Init(init::InitArgs),

    /// Get or set configuration
    Config(config::ConfigArgs),

    /// Show knowledge base statistics
    Stats(stats::StatsArgs),
}

impl Cli {
    /// Split into the shared options and the selected action
    pub fn into_action(self) -> (GlobalArgs, Action) {
        let action = if self.init.init {
            Action::Init(self.init)
        } else if self.stats.stats {
            Action::Stats(self.stats)
        } else if self.config.is_requested() {
            Action::Config(self.config)
        } else {
            Action::Ask(self.ask)
        };
        (self.global, action)
    }
}

/// Directory holding the running executable
pub fn install_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Cannot locate the knowledge executable")?;
    let exe = exe.canonicalize().unwrap_or(exe);
    Ok(exe
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}
