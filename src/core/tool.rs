//! Tool - Executables that answer a query by running
//!
//! Tools are discovered on disk but nothing runs until one wins the vote
//! (or is picked with `--tool`). The winner gets the query words as its
//! arguments.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use anyhow::{Context, Result};

/// A callable tool living in the store's arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    /// File stem of the executable
    pub name: String,
    pub path: PathBuf,
}

impl Tool {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Build a tool from an executable path, named by its file stem
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_stem()?.to_str()?.to_string();
        Some(Self::new(name, path))
    }

    /// Run the tool with the given arguments, inheriting stdio
    pub fn invoke<S: AsRef<str>>(&self, args: &[S]) -> Result<ExitStatus> {
        tracing::info!(tool = %self.name, path = %self.path.display(), "Invoking tool");
        Command::new(&self.path)
            .args(args.iter().map(|a| a.as_ref()))
            .status()
            .with_context(|| format!("Failed to run tool {} ({})", self.name, self.path.display()))
    }
}

/// Whether a directory entry looks like a runnable tool
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = path.metadata() else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}
