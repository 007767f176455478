//! Core module - Retrieval engine
//!
//! Tokenizer and classifier feed the scorer; the ranking combiner turns
//! the scored votes into one outcome.

pub mod entry;
pub mod error;
pub mod fragment;
pub mod ranking;
pub mod scorer;
pub mod store;
pub mod tool;
