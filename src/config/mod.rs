//! Configuration module
//!
//! ```toml
//! [knowledge.sources]
//! global = "~/.knowledge/information.json"
//!
//! [knowledge.tools]
//! global = "~/.knowledge/tools"
//!
//! [knowledge.extensions]
//! ```
//!
//! The first config file is the default one and is created when missing.
//! Further files are layered on top; a later file wins per key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Overrides the base directory (default `~/.knowledge`)
pub const HOME_ENV: &str = "KNOWLEDGE_HOME";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct KnowledgeConfig {
    /// Name → JSON source file
    #[serde(default)]
    pub sources: BTreeMap<String, PathBuf>,

    /// Name → directory of executable tools
    #[serde(default)]
    pub tools: BTreeMap<String, PathBuf>,

    /// Name → extension directory (`information.json` + `tools/`)
    #[serde(default)]
    pub extensions: BTreeMap<String, PathBuf>,
}

impl Config {
    /// Default configuration rooted at [`Config::base_dir`]
    pub fn with_defaults() -> Self {
        let base = Self::base_dir();
        let mut config = Self::default();
        config
            .knowledge
            .sources
            .insert("global".to_string(), base.join("information.json"));
        config
            .knowledge
            .tools
            .insert("global".to_string(), base.join("tools"));
        config
    }

    /// Load and layer config files
    ///
    /// `paths[0]` is created with defaults if it does not exist. Missing
    /// extra files are skipped.
    pub fn load(paths: &[PathBuf]) -> Result<Self> {
        let mut config = Self::default();

        for (i, path) in paths.iter().enumerate() {
            if !path.exists() {
                if i == 0 {
                    tracing::info!(path = %path.display(), "No default config; create default");
                    Self::with_defaults().save_to(path)?;
                } else {
                    tracing::warn!(path = %path.display(), "Config file not found, skipping");
                    continue;
                }
            }
            config.merge(Self::load_from(path)?);
        }

        config.expand_home();
        tracing::debug!(
            paths = ?paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
            "Loaded configuration"
        );
        for (section, key, value) in config.entries() {
            tracing::debug!("{}: {} --> {}", section, key, value.display());
        }
        Ok(config)
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Layer `other` on top of `self`
    pub fn merge(&mut self, other: Config) {
        self.knowledge.sources.extend(other.knowledge.sources);
        self.knowledge.tools.extend(other.knowledge.tools);
        self.knowledge.extensions.extend(other.knowledge.extensions);
    }

    /// Every `(section, key, path)` in the config
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str, &Path)> + '_ {
        [
            ("knowledge.sources", &self.knowledge.sources),
            ("knowledge.tools", &self.knowledge.tools),
            ("knowledge.extensions", &self.knowledge.extensions),
        ]
        .into_iter()
        .flat_map(|(section, map)| {
            map.iter()
                .map(move |(k, v)| (section, k.as_str(), v.as_path()))
        })
    }

    fn expand_home(&mut self) {
        for map in [
            &mut self.knowledge.sources,
            &mut self.knowledge.tools,
            &mut self.knowledge.extensions,
        ] {
            for path in map.values_mut() {
                *path = expand_home(path);
            }
        }
    }

    /// Base directory: `$KNOWLEDGE_HOME`, else `~/.knowledge`
    pub fn base_dir() -> PathBuf {
        if let Ok(home) = std::env::var(HOME_ENV) {
            return PathBuf::from(home);
        }
        home_dir().join(".knowledge")
    }

    /// Default config path (`<base>/config.toml`)
    pub fn default_path() -> PathBuf {
        Self::base_dir().join("config.toml")
    }

    /// Default log file path (`<base>/knowledge.log`)
    pub fn default_logfile() -> PathBuf {
        Self::base_dir().join("knowledge.log")
    }
}

fn home_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|u| u.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Expand a leading `~/` to the user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections() -> Result<()> {
        let config: Config = toml::from_str(
            r#"
            [knowledge.sources]
            global = "/data/information.json"
            work = "/data/work.json"

            [knowledge.tools]
            global = "/data/tools"
            "#,
        )?;
        assert_eq!(config.knowledge.sources.len(), 2);
        assert_eq!(
            config.knowledge.tools["global"],
            PathBuf::from("/data/tools")
        );
        assert!(config.knowledge.extensions.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_creates_default_and_layers_extras() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let default = dir.path().join("config.toml");
        let extra = dir.path().join("extra.toml");
        let missing = dir.path().join("missing.toml");
        std::fs::write(
            &extra,
            "[knowledge.sources]\nglobal = \"/override.json\"\nwork = \"/work.json\"\n",
        )?;

        let config = Config::load(&[default.clone(), extra, missing])?;

        assert!(default.exists());
        assert_eq!(
            config.knowledge.sources["global"],
            PathBuf::from("/override.json")
        );
        assert_eq!(config.knowledge.sources["work"], PathBuf::from("/work.json"));
        assert!(config.knowledge.tools.contains_key("global"));
        Ok(())
    }

    #[test]
    fn test_save_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sub").join("config.toml");

        let mut config = Config::default();
        config
            .knowledge
            .extensions
            .insert("notes".into(), PathBuf::from("/ext/notes"));
        config.save_to(&path)?;

        assert_eq!(Config::load_from(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("/abs/path")), PathBuf::from("/abs/path"));
        assert_eq!(expand_home(Path::new("~/notes.json")), home_dir().join("notes.json"));
    }

    #[test]
    fn test_entries_lists_every_section() {
        let mut config = Config::default();
        config.knowledge.sources.insert("a".into(), "/a".into());
        config.knowledge.tools.insert("b".into(), "/b".into());

        let entries: Vec<_> = config.entries().map(|(s, k, _)| (s, k)).collect();
        assert_eq!(
            entries,
            vec![("knowledge.sources", "a"), ("knowledge.tools", "b")]
        );
    }
}
