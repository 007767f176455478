//! Entry - Knowledge entries and their classification
//!
//! An entry is classified once, when it is loaded:
//! - **Scalar**: text or a number, returned as-is when it wins
//! - **KeyedMap**: key → value pairs, voted on by fuzzy-matching the key
//! - **Tool**: a handle into the store's tool arena
//!
//! Later stages match on the variant and never re-inspect raw JSON.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::error::{KnowledgeError, Result};

/// A value that can be returned to the caller and used as a vote key
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Immutable ordered sequence
    Seq(Arc<[Value]>),
}

impl Value {
    /// Convert a JSON value found inside a keyed map
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => number(&n),
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => Value::Seq(
                items
                    .into_iter()
                    .map(Value::from_json)
                    .collect::<Result<Vec<_>>>()?
                    .into(),
            ),
            serde_json::Value::Object(_) => {
                return Err(KnowledgeError::UnsupportedEntryShape {
                    shape: "object nested inside a keyed map",
                })
            }
        })
    }

    /// Whether this value may stand alone as a scalar entry
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Text(_))
    }
}

fn number(n: &serde_json::Number) -> Value {
    match n.as_i64() {
        Some(i) => Value::Int(i),
        None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::Seq(items) => items.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            // `{:?}` keeps the fractional part: 1.0 rather than 1
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match item {
                        Value::Text(s) => write!(f, "{:?}", s)?,
                        other => write!(f, "{}", other)?,
                    }
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Seq(items.into())
    }
}

/// Index of a tool in the store's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToolId(pub(crate) usize);

impl ToolId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tool#{}", self.0)
    }
}

/// Which vote pool an entry feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Fixed-score literal vote
    Literal,
    /// One literal vote per pair, scored by the key
    Keyed,
    /// Reference vote resolved through the tool arena
    Reference,
}

/// A loaded knowledge entry
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Scalar(Value),
    KeyedMap(Vec<(String, Value)>),
    Tool(ToolId),
}

impl Entry {
    /// Classify one deserialized JSON entry
    ///
    /// # Errors
    /// `UnsupportedEntryShape` for top-level booleans, nulls and arrays,
    /// and for objects nested inside a keyed map.
    pub fn classify(json: serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::String(s) => Ok(Entry::Scalar(Value::Text(s))),
            serde_json::Value::Number(n) => Ok(Entry::Scalar(number(&n))),
            serde_json::Value::Object(map) => {
                let pairs = map
                    .into_iter()
                    .map(|(k, v)| Ok((k, Value::from_json(v)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Entry::KeyedMap(pairs))
            }
            serde_json::Value::Bool(_) => Err(KnowledgeError::UnsupportedEntryShape {
                shape: "boolean",
            }),
            serde_json::Value::Null => {
                Err(KnowledgeError::UnsupportedEntryShape { shape: "null" })
            }
            serde_json::Value::Array(_) => {
                Err(KnowledgeError::UnsupportedEntryShape { shape: "array" })
            }
        }
    }

    /// Build a scalar entry
    pub fn scalar(value: impl Into<Value>) -> Result<Self> {
        let value = value.into();
        if !value.is_scalar() {
            return Err(KnowledgeError::UnsupportedEntryShape {
                shape: "non-scalar value used as a scalar entry",
            });
        }
        Ok(Entry::Scalar(value))
    }

    /// Build a keyed map, stringifying keys
    pub fn keyed_map<K, V, I>(pairs: I) -> Self
    where
        K: fmt::Display,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Entry::KeyedMap(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }

    pub fn category(&self) -> Category {
        match self {
            Entry::Scalar(_) => Category::Literal,
            Entry::KeyedMap(_) => Category::Keyed,
            Entry::Tool(_) => Category::Reference,
        }
    }
}
