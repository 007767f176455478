//! knowledge CLI - Entry point
//!
//! Usage: knowledge [options] <query words...>
//!        knowledge --init | --config [KEY [VALUE]] | --stats

use anyhow::Result;
use clap::Parser;

use knowledge::cli::{Action, Cli};
use knowledge::logging::FAILURE_TARGET;

fn main() -> Result<()> {
    let (global, action) = Cli::parse().into_action();

    if global.show_path {
        println!("{}", knowledge::cli::install_dir()?.display());
        return Ok(());
    }

    knowledge::logging::init(global.debug, &global.logfile())?;
    tracing::info!("Knowledge starting");

    let result = match action {
        Action::Ask(args) => knowledge::cli::ask::run(args, &global),
        Action::Init(args) => knowledge::cli::init::run(args, &global),
        Action::Config(args) => knowledge::cli::config::run(args, &global),
        Action::Stats(args) => knowledge::cli::stats::execute(args, &global),
    };

    // The console already gets anyhow's report from `main`
    if let Err(err) = &result {
        tracing::error!(target: FAILURE_TARGET, "{:#}", err);
    }
    tracing::info!("Knowledge shutting down...");

    result
}
