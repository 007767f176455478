//! Fragment - Query tokenizer
//!
//! Words are compared as lists of 2-byte windows over their UTF-8 bytes.
//! A word shorter than two bytes is a single fragment holding the whole word.
//!
//! # Example
//! `"cat"` → `["ca", "at"]`, `"a"` → `["a"]`

use std::fmt;

/// A 0-, 1- or 2-byte window of a token's bytes
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fragment {
    bytes: [u8; 2],
    len: u8,
}

impl Fragment {
    fn from_slice(slice: &[u8]) -> Self {
        debug_assert!(slice.len() <= 2);
        let mut bytes = [0u8; 2];
        bytes[..slice.len()].copy_from_slice(slice);
        Self {
            bytes,
            len: slice.len() as u8,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.as_bytes().escape_ascii())
    }
}

pub type FragmentList = Vec<Fragment>;

/// Split a token into its fragments
///
/// Yields exactly `max(1, len - 1)` fragments for a token of `len` bytes.
pub fn fragments(token: &str) -> FragmentList {
    let bytes = token.as_bytes();
    if bytes.len() < 2 {
        vec![Fragment::from_slice(bytes)]
    } else {
        bytes.windows(2).map(Fragment::from_slice).collect()
    }
}

/// A query word with its fragments
#[derive(Debug, Clone)]
pub struct QueryWord {
    pub word: String,
    pub fragments: FragmentList,
}

/// A tokenized query and the best raw score it could reach
#[derive(Debug, Clone)]
pub struct TokenizedQuery {
    pub words: Vec<QueryWord>,
    pub max_score: usize,
}

impl TokenizedQuery {
    pub fn new<S: AsRef<str>>(words: &[S]) -> Self {
        let words: Vec<QueryWord> = words
            .iter()
            .map(|w| QueryWord {
                word: w.as_ref().to_string(),
                fragments: fragments(w.as_ref()),
            })
            .collect();
        // Every fragment list holds max(1, len - 1) entries
        let max_score = words.iter().map(|w| w.fragments.len()).sum();

        tracing::debug!(
            max_score,
            fragments = ?words.iter().map(|w| (&w.word, &w.fragments)).collect::<Vec<_>>(),
            "Tokenized query"
        );

        Self { words, max_score }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
