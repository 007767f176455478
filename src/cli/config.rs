//! `knowledge --config`
//!
//! Get or set configuration values.
//!
//! # Usage
//! ```bash
//! knowledge --config                                   # Show all config values
//! knowledge --config knowledge.sources.global          # Get specific value
//! knowledge --config knowledge.sources.work ~/w.json   # Set value
//! knowledge --config-path                              # Show config paths
//! ```

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;

use super::GlobalArgs;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Get or set configuration (key like knowledge.sources.global; no key lists all)
    #[arg(long, num_args = 0..=2, value_names = ["KEY", "VALUE"])]
    pub config: Option<Vec<String>>,

    /// Show config file paths
    #[arg(long)]
    pub config_path: bool,
}

impl ConfigArgs {
    pub fn is_requested(&self) -> bool {
        self.config.is_some() || self.config_path
    }
}

pub fn run(args: ConfigArgs, global: &GlobalArgs) -> Result<()> {
    let config_path = Config::default_path();

    if args.config_path {
        for (i, path) in global.config_paths().iter().enumerate() {
            let marker = if path.exists() { "✓" } else { "⚠" };
            let role = if i == 0 { "default" } else { "extra" };
            println!("{} {:<8} {}", marker, role, path.display());
        }
        return Ok(());
    }

    let mut words = args.config.unwrap_or_default().into_iter();
    match (words.next(), words.next()) {
        (None, _) => {
            let config = global.load_config()?;
            println!("📋 Configuration ({}):\n", config_path.display());
            for (section, name, path) in config.entries() {
                println!("{}.{} = {}", section, name, path.display());
            }
        }
        (Some(key), Some(value)) => {
            set_config_value(&config_path, &key, &value)?;
            println!("✅ Set {} = {} (in {})", key, value, config_path.display());
        }
        (Some(key), None) => match get_config_value(&config_path, &key)? {
            Some(v) => println!("{}", v),
            None => println!("(not set)"),
        },
    }

    Ok(())
}

/// Set a nested config value using dot notation (e.g., "knowledge.tools.work")
fn set_config_value(path: &Path, key: &str, val: &str) -> Result<()> {
    use toml_edit::{value, DocumentMut, Item, Table};

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut doc: DocumentMut = content.parse().context("Failed to parse config.toml")?;

    let parts: Vec<&str> = key.split('.').collect();
    let Some((last, tables)) = parts.split_last() else {
        bail!("Empty config key");
    };
    if parts.iter().any(|p| p.is_empty()) {
        bail!("Invalid config key: {}", key);
    }

    let mut table = doc.as_table_mut();
    for name in tables {
        let item = table.entry(name).or_insert_with(|| {
            let mut t = Table::new();
            t.set_implicit(true);
            Item::Table(t)
        });
        table = item
            .as_table_mut()
            .with_context(|| format!("{} is not a table", name))?;
    }
    table[*last] = value(val);

    fs::write(path, doc.to_string())?;
    Ok(())
}

/// Get a config value by dot notation key
fn get_config_value(path: &Path, key: &str) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let doc: toml::Table = toml::from_str(&content).context("Failed to parse config.toml")?;

    let mut parts = key.split('.');
    let Some(root) = parts.next().and_then(|p| doc.get(p)) else {
        return Ok(None);
    };
    let val = parts.try_fold(root, |node, part| node.get(part));

    Ok(val.map(|v| match v {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get_nested_key() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");

        set_config_value(&path, "knowledge.sources.work", "/data/work.json")?;
        set_config_value(&path, "knowledge.sources.global", "/data/info.json")?;

        assert_eq!(
            get_config_value(&path, "knowledge.sources.work")?.as_deref(),
            Some("/data/work.json")
        );
        assert_eq!(get_config_value(&path, "knowledge.tools.global")?, None);

        let config = Config::load_from(&path)?;
        assert_eq!(config.knowledge.sources.len(), 2);
        Ok(())
    }

    #[test]
    fn test_set_rejects_bad_keys() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        assert!(set_config_value(&path, "knowledge..global", "x").is_err());

        fs::write(&path, "knowledge = \"flat\"\n")?;
        assert!(set_config_value(&path, "knowledge.sources.global", "x").is_err());
        Ok(())
    }
}
