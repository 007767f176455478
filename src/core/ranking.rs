//! Ranking - Collect votes and pick one winner
//!
//! Votes land in three pools:
//! - **literal**: the key is the value handed back to the caller
//! - **reference**: the key is a `ToolId`, resolved through the store
//! - **direct**: reserved, always scores 0.0 and holds no candidate
//!
//! Each pool's winner is its highest score; the overall winner is the best
//! pool winner. Ties go to whichever came first, both inside a pool and
//! across pools (literal, then reference, then direct).

use std::collections::HashMap;
use std::hash::Hash;

use super::entry::{Entry, ToolId, Value};
use super::error::Result;
use super::fragment::TokenizedQuery;
use super::scorer::{score_key, KeyScore};
use super::store::KnowledgeStore;
use super::tool::Tool;

/// Score of a scalar entry
pub const SCALAR_SCORE: f64 = 1.0;
/// Score of a tool entry
pub const TOOL_SCORE: f64 = 2.0;
/// Score of the reserved direct pool
pub const DIRECT_SCORE: f64 = 0.0;

/// Insertion-ordered votes
///
/// Casting a key twice keeps its first position and overwrites the score.
#[derive(Debug, Clone)]
pub struct VotePool<K> {
    votes: Vec<(K, f64)>,
    index: HashMap<K, usize>,
}

impl<K> Default for VotePool<K> {
    fn default() -> Self {
        Self {
            votes: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> VotePool<K> {
    /// Record a vote, returning the score it replaced
    pub fn cast(&mut self, key: K, score: f64) -> Option<f64> {
        match self.index.get(&key) {
            Some(&i) => Some(std::mem::replace(&mut self.votes[i].1, score)),
            None => {
                self.index.insert(key.clone(), self.votes.len());
                self.votes.push((key, score));
                None
            }
        }
    }

    /// Highest score, first-cast wins ties
    pub fn winner(&self) -> Option<(&K, f64)> {
        let mut best: Option<(&K, f64)> = None;
        for (key, score) in &self.votes {
            if best.map_or(true, |(_, top)| *score > top) {
                best = Some((key, *score));
            }
        }
        best
    }

    pub fn get(&self, key: &K) -> Option<f64> {
        self.index.get(key).map(|&i| self.votes[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> {
        self.votes.iter().map(|(k, s)| (k, *s))
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}

/// Which pool a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Literal,
    Reference,
    Direct,
}

impl std::fmt::Display for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pool::Literal => write!(f, "literal"),
            Pool::Reference => write!(f, "reference"),
            Pool::Direct => write!(f, "direct"),
        }
    }
}

/// Every vote cast for one query
#[derive(Debug, Clone)]
pub struct Ballot {
    pub query: TokenizedQuery,
    pub literal: VotePool<Value>,
    pub reference: VotePool<ToolId>,
    /// Scores of every keyed-map key, in store order
    pub keys: Vec<KeyScore>,
}

impl Ballot {
    /// Score every entry of the store against `query`
    pub fn collect(store: &KnowledgeStore, query: TokenizedQuery) -> Self {
        if query.is_empty() {
            tracing::info!("Empty query, keyed entries score 0.0");
        }

        let mut ballot = Self {
            query,
            literal: VotePool::default(),
            reference: VotePool::default(),
            keys: Vec::new(),
        };

        for entry in store {
            match entry {
                Entry::Scalar(value) => ballot.cast_literal(value, SCALAR_SCORE),
                Entry::KeyedMap(pairs) => {
                    for (key, value) in pairs {
                        let scored = score_key(key, &ballot.query);
                        ballot.cast_literal(value, scored.normalized);
                        ballot.keys.push(scored);
                    }
                }
                Entry::Tool(id) => {
                    ballot.reference.cast(*id, TOOL_SCORE);
                }
            }
        }

        tracing::debug!(
            literal = ?ballot.literal.iter().map(|(v, s)| (v.to_string(), s)).collect::<Vec<_>>(),
            reference = ?ballot.reference.iter().collect::<Vec<_>>(),
            "Vote pools"
        );
        ballot
    }

    fn cast_literal(&mut self, value: &Value, score: f64) {
        if let Some(previous) = self.literal.cast(value.clone(), score) {
            tracing::debug!(%value, previous, score, "Overwrote literal vote");
        }
    }

    /// Best candidate of each pool, in tie-break order
    pub fn pool_winners(&self) -> [(Pool, Option<f64>); 3] {
        [
            (Pool::Literal, self.literal.winner().map(|(_, s)| s)),
            (Pool::Reference, self.reference.winner().map(|(_, s)| s)),
            (Pool::Direct, Some(DIRECT_SCORE)),
        ]
    }

    /// Pool holding the overall winner, if the literal pool has any votes
    pub fn winning_pool(&self) -> Option<(Pool, f64)> {
        if self.literal.is_empty() {
            return None;
        }

        let mut best: Option<(Pool, f64)> = None;
        for (pool, score) in self.pool_winners() {
            let Some(score) = score else { continue };
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((pool, score));
            }
        }
        best
    }
}

/// What a query resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<'s> {
    /// A value to print
    Literal { value: Value, score: f64 },
    /// A tool to invoke with the query words
    Tool { tool: &'s Tool, score: f64 },
    /// Nothing to vote on
    NoResult,
}

/// Pick the winner of a ballot
///
/// # Errors
/// `DanglingReference` if a winning tool id does not resolve in `store`.
pub fn rank<'s>(ballot: &Ballot, store: &'s KnowledgeStore) -> Result<Outcome<'s>> {
    let Some((pool, score)) = ballot.winning_pool() else {
        tracing::info!("No literal votes, no result");
        return Ok(Outcome::NoResult);
    };

    let outcome = match pool {
        Pool::Literal => match ballot.literal.winner() {
            Some((value, score)) => {
                log_losers(ballot, Some(value), None);
                Outcome::Literal {
                    value: value.clone(),
                    score,
                }
            }
            None => Outcome::NoResult,
        },
        Pool::Reference => {
            let id = ballot.reference.winner().map(|(id, _)| *id);
            log_losers(ballot, None, id);
            match id {
                Some(id) => Outcome::Tool {
                    tool: store.tool(id)?,
                    score,
                },
                None => Outcome::NoResult,
            }
        }
        Pool::Direct => {
            log_losers(ballot, None, None);
            Outcome::NoResult
        }
    };

    tracing::info!(%pool, score, "Query resolved");
    Ok(outcome)
}

fn log_losers(ballot: &Ballot, literal: Option<&Value>, reference: Option<ToolId>) {
    for (value, score) in ballot.literal.iter() {
        if Some(value) != literal {
            tracing::debug!(%value, score, "Losing literal vote");
        }
    }
    for (id, score) in ballot.reference.iter() {
        if Some(*id) != reference {
            tracing::debug!(%id, score, "Losing reference vote");
        }
    }
}

/// Query engine over one read-only store
pub struct Engine<'s> {
    store: &'s KnowledgeStore,
}

impl<'s> Engine<'s> {
    pub fn new(store: &'s KnowledgeStore) -> Self {
        Self { store }
    }

    /// Tokenize and score every entry
    pub fn search<S: AsRef<str>>(&self, words: &[S]) -> Ballot {
        Ballot::collect(self.store, TokenizedQuery::new(words))
    }

    /// Pick the winner of a ballot produced by [`Engine::search`]
    pub fn rank(&self, ballot: &Ballot) -> Result<Outcome<'s>> {
        rank(ballot, self.store)
    }

    /// Search and rank inside a per-query span, keeping the ballot
    pub fn vote<S: AsRef<str>>(&self, words: &[S]) -> Result<(Ballot, Outcome<'s>)> {
        let span = tracing::info_span!("query", words = words.len());
        let _guard = span.enter();

        let ballot = self.search(words);
        let outcome = self.rank(&ballot)?;
        Ok((ballot, outcome))
    }

    /// Search and rank in one step
    pub fn ask<S: AsRef<str>>(&self, words: &[S]) -> Result<Outcome<'s>> {
        self.vote(words).map(|(_, outcome)| outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::KnowledgeError;

    fn store(entries: Vec<Entry>) -> KnowledgeStore {
        let mut store = KnowledgeStore::new();
        for entry in entries {
            store.push(entry);
        }
        store
    }

    #[test]
    fn test_vote_pool_first_wins_ties_and_overwrites_in_place() {
        let mut pool = VotePool::default();
        assert_eq!(pool.cast("a", 0.5), None);
        assert_eq!(pool.cast("b", 0.9), None);
        assert_eq!(pool.cast("c", 0.9), None);
        assert_eq!(pool.winner(), Some((&"b", 0.9)));

        assert_eq!(pool.cast("a", 0.9), Some(0.5));
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.winner(), Some((&"a", 0.9)));
    }

    #[test]
    fn test_single_keyed_entry_wins() -> Result<()> {
        let store = store(vec![Entry::keyed_map([("cat", "says meow")])]);
        let engine = Engine::new(&store);

        let ballot = engine.search(&["cat"]);
        assert_eq!(ballot.keys[0].normalized, 1.0);

        let outcome = engine.rank(&ballot)?;
        assert_eq!(
            outcome,
            Outcome::Literal {
                value: Value::from("says meow"),
                score: 1.0
            }
        );
        Ok(())
    }

    #[test]
    fn test_scalar_and_keyed_tie_goes_to_scalar() -> Result<()> {
        // Scalar scores 1.0; "hello world" gives "hello" 4 of 4 fragments
        let store = store(vec![
            Entry::scalar("hello")?,
            Entry::keyed_map([("hello world", "greeting")]),
        ]);
        let engine = Engine::new(&store);

        let ballot = engine.search(&["hello"]);
        assert_eq!(ballot.literal.get(&Value::from("hello")), Some(1.0));
        assert_eq!(ballot.literal.get(&Value::from("greeting")), Some(1.0));
        assert_eq!(
            engine.rank(&ballot)?,
            Outcome::Literal {
                value: Value::from("hello"),
                score: 1.0
            }
        );
        Ok(())
    }

    #[test]
    fn test_keyed_beats_scalar_only_when_first() -> Result<()> {
        let store = store(vec![
            Entry::keyed_map([("hello world", "greeting")]),
            Entry::scalar("hello")?,
        ]);
        let outcome = Engine::new(&store).ask(&["hello"])?;
        assert_eq!(
            outcome,
            Outcome::Literal {
                value: Value::from("greeting"),
                score: 1.0
            }
        );
        Ok(())
    }

    #[test]
    fn test_empty_store_is_no_result() -> Result<()> {
        let store = KnowledgeStore::new();
        assert_eq!(Engine::new(&store).ask(&["anything"])?, Outcome::NoResult);
        Ok(())
    }

    #[test]
    fn test_tools_only_store_is_no_result() -> Result<()> {
        let mut store = KnowledgeStore::new();
        store.add_tool(Tool::new("weather", "/bin/true"));
        assert_eq!(Engine::new(&store).ask(&["weather"])?, Outcome::NoResult);
        Ok(())
    }

    #[test]
    fn test_empty_query_scores_keyed_zero() -> Result<()> {
        let store = store(vec![Entry::keyed_map([("cat", "says meow"), ("dog", "woof")])]);
        let engine = Engine::new(&store);

        let ballot = engine.search::<&str>(&[]);
        assert_eq!(ballot.query.max_score, 0);
        assert!(ballot.keys.iter().all(|k| k.normalized == 0.0));
        assert_eq!(
            engine.rank(&ballot)?,
            Outcome::Literal {
                value: Value::from("says meow"),
                score: 0.0
            }
        );
        Ok(())
    }

    #[test]
    fn test_tied_keys_first_encountered_wins() -> Result<()> {
        let store = store(vec![Entry::keyed_map([
            ("apple pie", "first"),
            ("pie apple", "second"),
        ])]);
        let ballot = Engine::new(&store).search(&["apple"]);
        assert_eq!(ballot.keys[0].normalized, ballot.keys[1].normalized);
        assert_eq!(
            rank(&ballot, &store)?,
            Outcome::Literal {
                value: Value::from("first"),
                score: 1.0
            }
        );
        Ok(())
    }

    #[test]
    fn test_duplicate_values_last_write_wins() {
        let store = store(vec![Entry::keyed_map([
            ("cat", "pet"),
            ("dog", "pet"),
        ])]);
        let ballot = Engine::new(&store).search(&["cat"]);

        assert_eq!(ballot.literal.len(), 1);
        assert_eq!(ballot.literal.get(&Value::from("pet")), Some(0.0));
    }

    #[test]
    fn test_tool_outscores_literals() -> Result<()> {
        let mut store = store(vec![Entry::keyed_map([("cat", "says meow")])]);
        store.add_tool(Tool::new("weather", "/bin/true"));

        let outcome = Engine::new(&store).ask(&["cat"])?;
        let Outcome::Tool { tool, score } = outcome else {
            panic!("expected a tool to win");
        };
        assert_eq!(tool.name, "weather");
        assert_eq!(score, TOOL_SCORE);
        Ok(())
    }

    #[test]
    fn test_dangling_reference_is_fatal() {
        let mut tools = KnowledgeStore::new();
        tools.add_tool(Tool::new("weather", "/bin/true"));
        let mut ballot = Engine::new(&tools).search(&["cat"]);
        ballot.literal.cast(Value::from("x"), SCALAR_SCORE);

        // Ranked against a store whose arena has no tool #0
        let other = store(vec![Entry::Tool(ToolId(0))]);
        assert_eq!(
            rank(&ballot, &other),
            Err(KnowledgeError::DanglingReference { id: ToolId(0) })
        );
    }

    #[test]
    fn test_same_input_same_output() -> Result<()> {
        let store = store(vec![
            Entry::keyed_map([("hello world", "greeting"), ("goodbye world", "farewell")]),
            Entry::scalar(42i64)?,
        ]);
        let engine = Engine::new(&store);
        let first = engine.ask(&["world", "bye"])?;
        let second = engine.ask(&["world", "bye"])?;
        assert_eq!(first, second);
        assert_eq!(
            first,
            Outcome::Literal {
                value: Value::from("farewell"),
                score: 1.0
            }
        );
        Ok(())
    }
}
