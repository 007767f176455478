//! Scorer - Fuzzy overlap between a key and the query
//!
//! A key is split on whitespace into subkeys. For every query word, each
//! subkey gets a streak: how many of the word's fragments it contains.
//! The key's raw score adds up the best streak per word, so different
//! subkeys may win different words. Dividing by the query's max score
//! keeps the result in `[0, 1]`.

use std::collections::HashMap;

use super::error::{KnowledgeError, Result};
use super::fragment::{fragments, Fragment, FragmentList, TokenizedQuery};

/// Streaks of one subkey against every query word
#[derive(Debug, Clone)]
pub struct SubkeyScore {
    pub subkey: String,
    pub fragments: FragmentList,
    /// One streak per query word, in query order
    pub streaks: Vec<usize>,
}

/// Score of one keyed-map key
#[derive(Debug, Clone)]
pub struct KeyScore {
    pub key: String,
    pub subkeys: Vec<SubkeyScore>,
    pub raw: usize,
    pub normalized: f64,
}

/// Count query fragments found in `target`
///
/// Multiset containment: each target fragment satisfies at most one query
/// fragment, and order does not matter.
pub fn streak(query: &[Fragment], target: &[Fragment]) -> usize {
    let mut available: HashMap<Fragment, usize> = HashMap::with_capacity(target.len());
    for fragment in target {
        *available.entry(*fragment).or_default() += 1;
    }

    query
        .iter()
        .filter(|fragment| match available.get_mut(fragment) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        })
        .count()
}

/// Normalize a raw score by the query's max score
///
/// # Errors
/// `EmptyQuery` when the max score is zero.
pub fn normalize(raw: usize, max_score: usize) -> Result<f64> {
    if max_score == 0 {
        return Err(KnowledgeError::EmptyQuery);
    }
    Ok(raw as f64 / max_score as f64)
}

/// Score a keyed-map key against a tokenized query
pub fn score_key(key: &str, query: &TokenizedQuery) -> KeyScore {
    let subkeys: Vec<SubkeyScore> = key
        .split_whitespace()
        .map(|subkey| {
            let target = fragments(subkey);
            let streaks = query
                .words
                .iter()
                .map(|word| streak(&word.fragments, &target))
                .collect();
            SubkeyScore {
                subkey: subkey.to_string(),
                fragments: target,
                streaks,
            }
        })
        .collect();

    let raw = (0..query.words.len())
        .map(|i| subkeys.iter().map(|s| s.streaks[i]).max().unwrap_or(0))
        .sum();

    let normalized = match normalize(raw, query.max_score) {
        Ok(score) => score,
        Err(err) => {
            tracing::debug!(key, %err, "Scoring key as 0.0");
            0.0
        }
    };

    tracing::debug!(
        key,
        raw,
        normalized,
        streaks = ?subkeys
            .iter()
            .map(|s| (&s.subkey, &s.fragments, &s.streaks))
            .collect::<Vec<_>>(),
        "Scored key"
    );

    KeyScore {
        key: key.to_string(),
        subkeys,
        raw,
        normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn score(key: &str, words: &[&str]) -> KeyScore {
        score_key(key, &TokenizedQuery::new(words))
    }

    #[test]
    fn test_exact_match_scores_one() {
        let result = score("cat", &["cat"]);
        assert_eq!(result.raw, 2);
        assert_eq!(result.normalized, 1.0);
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        let result = score("dog", &["cat"]);
        assert_eq!(result.raw, 0);
        assert_eq!(result.normalized, 0.0);
    }

    #[test]
    fn test_subkeys_win_different_words() {
        // "hello" wins the first word, "world" the second
        let result = score("hello world", &["hello", "world"]);
        assert_eq!(result.subkeys.len(), 2);
        assert_eq!(result.subkeys[0].streaks, vec![4, 0]);
        assert_eq!(result.subkeys[1].streaks, vec![0, 4]);
        assert_eq!(result.raw, 8);
        assert_eq!(result.normalized, 1.0);
    }

    #[test]
    fn test_partial_overlap() {
        // "cart" → ca ar rt ; "cat" → ca at
        let result = score("cart", &["cat"]);
        assert_eq!(result.raw, 1);
        assert_eq!(result.normalized, 0.5);
    }

    #[test]
    fn test_streak_is_multiset_not_ordered() {
        let query = fragments("abab"); // ab ba ab
        assert_eq!(streak(&query, &fragments("ab")), 1);
        assert_eq!(streak(&query, &fragments("abxab")), 2);
        assert_eq!(streak(&query, &fragments("babab")), 3);
    }

    #[test]
    fn test_single_byte_words() {
        let result = score("a b", &["a"]);
        assert_eq!(result.normalized, 1.0);

        let result = score("ab", &["a"]);
        assert_eq!(result.normalized, 0.0);
    }

    #[test]
    fn test_blank_key_scores_zero() {
        let result = score("   ", &["cat"]);
        assert!(result.subkeys.is_empty());
        assert_eq!(result.normalized, 0.0);
    }

    #[test]
    fn test_empty_query_falls_back_to_zero() {
        assert_eq!(normalize(0, 0), Err(KnowledgeError::EmptyQuery));

        let result = score("cat", &[]);
        assert_eq!(result.raw, 0);
        assert_eq!(result.normalized, 0.0);
    }

    fn random_word(rng: &mut StdRng) -> String {
        const ALPHABET: &[char] = &['a', 'b', 'c', 'd', ' ', 'é', '日'];
        let len = rng.gen_range(0..8);
        (0..len)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
            .collect()
    }

    #[test]
    fn test_normalized_score_stays_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(0x9E37_79B9_7F4A_7C15);

        for _ in 0..2000 {
            let key = random_word(&mut rng);
            let n_words = rng.gen_range(1..=4);
            let words: Vec<String> = (0..n_words).map(|_| random_word(&mut rng)).collect();

            let query = TokenizedQuery::new(&words);
            let result = score_key(&key, &query);
            assert!(
                (0.0..=1.0).contains(&result.normalized),
                "key={key:?} words={words:?} score={}",
                result.normalized
            );
            assert!(result.raw <= query.max_score);
        }
    }
}
