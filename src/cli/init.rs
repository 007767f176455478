//! `knowledge --init`
//!
//! Writes the default configuration, an empty global knowledge source and
//! the global tool directory.
//!
//! # Usage
//! ```bash
//! knowledge --init           # Create ~/.knowledge
//! knowledge --init --force   # Overwrite the default config
//! ```

use std::fs;

use anyhow::{bail, Result};
use clap::Args;

use super::GlobalArgs;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Write the default configuration and knowledge source
    #[arg(long)]
    pub init: bool,

    /// Overwrite an existing configuration
    #[arg(short, long, requires = "init")]
    pub force: bool,
}

pub fn run(args: InitArgs, _global: &GlobalArgs) -> Result<()> {
    let config_path = Config::default_path();

    if config_path.exists() && !args.force {
        bail!(
            "Configuration already exists at {}. Use --init --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::with_defaults();
    config.save_to(&config_path)?;
    tracing::info!(path = %config_path.display(), "Wrote default configuration");

    for source in config.knowledge.sources.values() {
        if !source.exists() {
            if let Some(parent) = source.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(source, "{}")?;
        }
    }
    for dir in config.knowledge.tools.values() {
        fs::create_dir_all(dir)?;
    }

    println!("✅ Initialized knowledge");
    println!("   Config: {}", config_path.display());
    for (section, name, path) in config.entries() {
        println!("   {}.{}: {}", section, name, path.display());
    }
    println!("\nNext steps:");
    println!("  add \"key words\": \"answer\" pairs to the global source");
    println!("  knowledge key words");

    Ok(())
}
