//! knowledge - Personal knowledge retrieval CLI
//!
//! Ask a free-text question, get the single best matching entry back.
//!
//! ## Key Concepts
//!
//! - **Entries**: scalars, keyed maps (key → answer) and callable tools
//! - **Fragments**: words compared as 2-byte windows of their UTF-8 bytes
//! - **Votes**: every entry votes for itself; the best score wins
//! - **Tools**: executables that win the vote are run with the query words

pub mod cli;
pub mod config;
pub mod core;
pub mod logging;

pub use crate::core::entry::{Entry, Value};
pub use crate::core::error::KnowledgeError;
pub use crate::core::ranking::{Ballot, Engine, Outcome};
pub use crate::core::store::KnowledgeStore;
pub use crate::core::tool::Tool;
