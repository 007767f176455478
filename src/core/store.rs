//! Store - The loaded knowledge for one invocation
//!
//! Entries are loaded once and then read-only while a query runs. Tools
//! live in an arena owned by the store; entries and votes refer to them by
//! `ToolId`, and resolving an id is an explicit lookup that can fail.
//!
//! Nothing here is synchronized. A long-lived caller must hand each query
//! its own snapshot or lock around mutation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use super::entry::{Entry, ToolId};
use super::error::KnowledgeError;
use super::tool::{is_executable, Tool};
use crate::config::Config;

/// Source file name expected inside an extension directory
pub const EXTENSION_SOURCE: &str = "information.json";
/// Tool directory name expected inside an extension directory
pub const EXTENSION_TOOLS: &str = "tools";

#[derive(Debug, Default)]
pub struct KnowledgeStore {
    entries: Vec<Entry>,
    tools: Vec<Tool>,
}

/// Entry counts per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub entries: usize,
    pub scalars: usize,
    pub keyed_maps: usize,
    /// Key/value pairs across all keyed maps
    pub pairs: usize,
    pub tools: usize,
}

impl KnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every source, tool directory and extension named by `config`
    pub fn load(config: &Config) -> Result<Self> {
        let mut store = Self::new();

        for (name, path) in &config.knowledge.sources {
            tracing::info!(source = %name, path = %path.display(), "Load knowledge source");
            store.load_source(path, true)?;
        }

        for (name, dir) in &config.knowledge.tools {
            tracing::info!(tools = %name, dir = %dir.display(), "Load tool directory");
            store.load_tools(dir)?;
        }

        for (name, dir) in &config.knowledge.extensions {
            tracing::info!(extension = %name, dir = %dir.display(), "Load extension");
            let source = dir.join(EXTENSION_SOURCE);
            if source.exists() {
                store.load_source(&source, false)?;
            }
            store.load_tools(&dir.join(EXTENSION_TOOLS))?;
        }

        tracing::info!(
            entries = store.len(),
            tools = store.tools.len(),
            "KnowledgeStore initialized"
        );
        Ok(store)
    }

    /// Load one JSON source file
    ///
    /// A top-level object is one keyed-map entry (nothing if empty), an
    /// array is one entry per element, and a scalar is one scalar entry.
    /// With `create`, a missing file is written as `{}` first.
    pub fn load_source(&mut self, path: &Path, create: bool) -> Result<()> {
        if !path.exists() {
            if !create {
                tracing::warn!(path = %path.display(), "Knowledge source missing, skipping");
                return Ok(());
            }
            tracing::info!(path = %path.display(), "Create new knowledge source");
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, "{}")?;
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read knowledge source {}", path.display()))?;
        let json: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;

        let before = self.entries.len();
        match json {
            serde_json::Value::Object(ref map) if map.is_empty() => {}
            serde_json::Value::Array(items) => {
                for item in items {
                    self.push(Entry::classify(item).with_context(|| {
                        format!("Bad entry in {}", path.display())
                    })?);
                }
            }
            other => {
                self.push(
                    Entry::classify(other)
                        .with_context(|| format!("Bad entry in {}", path.display()))?,
                );
            }
        }

        tracing::debug!(
            path = %path.display(),
            added = self.entries.len() - before,
            "Loaded knowledge source"
        );
        Ok(())
    }

    /// Register every executable in `dir` as a tool, in file-name order
    pub fn load_tools(&mut self, dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            tracing::info!(dir = %dir.display(), "No tool directory, skipping");
            return Ok(());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("Failed to list tools in {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_executable(path))
            .collect();
        paths.sort();

        for path in paths {
            if let Some(tool) = Tool::from_path(&path) {
                tracing::debug!(tool = %tool.name, path = %path.display(), "Registered tool");
                self.add_tool(tool);
            }
        }
        Ok(())
    }

    /// Append an already classified entry
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Move a tool into the arena and append its entry
    pub fn add_tool(&mut self, tool: Tool) -> ToolId {
        let id = ToolId(self.tools.len());
        self.tools.push(tool);
        self.entries.push(Entry::Tool(id));
        id
    }

    /// Resolve a tool handle
    ///
    /// # Errors
    /// `DanglingReference` if the id does not belong to this store.
    pub fn tool(&self, id: ToolId) -> Result<&Tool, KnowledgeError> {
        self.tools
            .get(id.0)
            .ok_or(KnowledgeError::DanglingReference { id })
    }

    /// Find a tool by name
    pub fn tool_named(&self, name: &str) -> Result<&Tool, KnowledgeError> {
        self.tools
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| KnowledgeError::UnknownTool {
                name: name.to_string(),
            })
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats {
            entries: self.entries.len(),
            ..Default::default()
        };
        for entry in &self.entries {
            match entry {
                Entry::Scalar(_) => stats.scalars += 1,
                Entry::KeyedMap(pairs) => {
                    stats.keyed_maps += 1;
                    stats.pairs += pairs.len();
                }
                Entry::Tool(_) => stats.tools += 1,
            }
        }
        stats
    }
}

impl<'a> IntoIterator for &'a KnowledgeStore {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
