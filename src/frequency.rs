// src/frequency.rs
//! Term-frequency ranking over normalized tokens.
//!
//! Ranking is descending by count. Ties keep the order in which each term
//! first appeared in the input; there is no business rule for ties, the
//! ordering only exists so identical input always renders the same chart.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFrequencyEntry {
    pub term: String,
    pub count: usize,
}

/// Full ranked table, one entry per distinct token.
pub fn term_counts<I, S>(tokens: I) -> Vec<TermFrequencyEntry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    // term -> (count, first-seen position)
    let mut seen: HashMap<String, (usize, usize)> = HashMap::new();
    for (pos, tok) in tokens.into_iter().enumerate() {
        let tok = tok.as_ref();
        match seen.get_mut(tok) {
            Some((count, _)) => *count += 1,
            None => {
                seen.insert(tok.to_string(), (1, pos));
            }
        }
    }

    let mut ranked: Vec<(String, usize, usize)> = seen
        .into_iter()
        .map(|(term, (count, first))| (term, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .map(|(term, count, _)| TermFrequencyEntry { term, count })
        .collect()
}

/// Top `n` terms. `n == 0` or empty input yields an empty vector.
pub fn top_terms<I, S>(tokens: I, n: usize) -> Vec<TermFrequencyEntry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if n == 0 {
        return Vec::new();
    }
    let mut all = term_counts(tokens);
    all.truncate(n);
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(term: &str, count: usize) -> TermFrequencyEntry {
        TermFrequencyEntry {
            term: term.to_string(),
            count,
        }
    }

    #[test]
    fn ranks_by_count_then_first_occurrence() {
        let toks = ["lento", "arepa", "caro", "arepa", "caro", "queso", "arepa"];
        let out = top_terms(toks, 10);
        assert_eq!(
            out,
            vec![
                entry("arepa", 3),
                entry("caro", 2),
                entry("lento", 1),
                entry("queso", 1)
            ]
        );
    }

    #[test]
    fn respects_requested_length() {
        let toks = ["uno", "dos", "tres", "cuatro", "cinco"];
        let out = top_terms(toks, 3);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].term, "uno");
        assert_eq!(out[2].term, "tres");
    }

    #[test]
    fn zero_n_and_empty_input_yield_empty() {
        assert!(top_terms(["arepa"], 0).is_empty());
        assert!(top_terms(Vec::<String>::new(), 10).is_empty());
        assert!(term_counts(Vec::<&str>::new()).is_empty());
    }

    #[test]
    fn output_is_sorted_non_increasing() {
        let text = "b a c a b a d e e e e f";
        for n in 0..8 {
            let out = top_terms(text.split(' '), n);
            assert!(out.len() <= n);
            assert!(out.windows(2).all(|w| w[0].count >= w[1].count));
            assert!(out.iter().all(|e| e.count >= 1));
        }
    }
}
