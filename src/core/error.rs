//! Engine errors
//!
//! Data-integrity failures surface to the caller as `KnowledgeError`.
//! An empty query and an empty literal pool are not failures: the scorer
//! falls back to 0.0 and ranking yields `Outcome::NoResult`.

use super::entry::ToolId;

pub type Result<T, E = KnowledgeError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum KnowledgeError {
    /// An entry is neither a scalar, a keyed map nor a tool
    #[error("Unsupported knowledge entry shape: {shape}")]
    UnsupportedEntryShape { shape: &'static str },

    /// Zero query words, so there is no maximum score to normalize against
    #[error("Empty query: nothing to normalize against")]
    EmptyQuery,

    /// A reference vote points outside the tool arena
    #[error("Dangling reference: tool #{} is not in the store", .id.index())]
    DanglingReference { id: ToolId },

    /// `--tool NAME` asked for a tool the store does not hold
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },
}
