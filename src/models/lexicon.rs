// src/models/lexicon.rs
//! Offline backends: lexicon scoring with a short negation window, and a
//! lead-sentence summarizer. Deterministic, no network; used for local runs
//! and tests. They answer in the same native shapes as the remote models
//! (`"N stars"`, `NEGATIVE`/`POSITIVE`).

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::{SummarizationModel, SummaryParams, TextClassificationModel};

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

static SENTENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.!?…]+[.!?…]*").expect("sentence regex"));

/// How many preceding tokens a negator reaches.
const NEGATION_WINDOW: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns `(score, token count)`. A negator within the previous
    /// `NEGATION_WINDOW` tokens flips the sign of a lexicon hit.
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        // Collected because negation looks backwards.
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;

        for i in 0..tokens.len() {
            let base = self.word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=NEGATION_WINDOW).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
        }

        (score, tokens.len())
    }

    /// Map a raw score onto the 1–5 star scale.
    pub fn stars(score: i32) -> u8 {
        match score {
            i32::MIN..=-3 => 1,
            -2..=-1 => 2,
            0 => 3,
            1..=2 => 4,
            _ => 5,
        }
    }
}

/// Alphanumeric tokens, Unicode-lowercased.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "no" | "nunca" | "jamás" | "tampoco" | "ni" | "sin" | "not" | "never" | "without"
    )
}

/// Star-rating backend: answers `"1 star"` … `"5 stars"`.
#[derive(Debug, Clone, Default)]
pub struct LexiconRatingModel {
    scorer: LexiconScorer,
}

impl LexiconRatingModel {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TextClassificationModel for LexiconRatingModel {
    async fn predict(&self, input: &str) -> anyhow::Result<String> {
        let (score, _) = self.scorer.score_text(input);
        Ok(match LexiconScorer::stars(score) {
            1 => "1 star".to_string(),
            n => format!("{n} stars"),
        })
    }

    fn name(&self) -> &str {
        "lexicon-rating"
    }
}

/// Polarity backend: answers `NEGATIVE` for a negative score, else `POSITIVE`.
#[derive(Debug, Clone, Default)]
pub struct LexiconPolarityModel {
    scorer: LexiconScorer,
}

impl LexiconPolarityModel {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TextClassificationModel for LexiconPolarityModel {
    async fn predict(&self, input: &str) -> anyhow::Result<String> {
        let (score, _) = self.scorer.score_text(input);
        Ok(if score < 0 { "NEGATIVE" } else { "POSITIVE" }.to_string())
    }

    fn name(&self) -> &str {
        "lexicon-polarity"
    }
}

/// Lead summarizer: whole leading sentences until `min_tokens` words are
/// reached, cut at `max_tokens` words.
#[derive(Debug, Clone, Default)]
pub struct LeadSummarizer;

impl LeadSummarizer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SummarizationModel for LeadSummarizer {
    async fn summarize(&self, input: &str, params: &SummaryParams) -> anyhow::Result<String> {
        let max = params.max_tokens.max(1) as usize;
        let min = (params.min_tokens as usize).min(max);

        let mut words: Vec<&str> = Vec::new();
        for sentence in SENTENCE.find_iter(input) {
            if words.len() >= min.max(1) {
                break;
            }
            words.extend(sentence.as_str().split_whitespace());
        }
        if words.is_empty() {
            anyhow::bail!("no sentences in input");
        }
        words.truncate(max);
        Ok(words.join(" "))
    }

    fn name(&self) -> &str {
        "lead-summarizer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(min: u32, max: u32) -> SummaryParams {
        SummaryParams {
            min_tokens: min,
            max_tokens: max,
            do_sample: false,
        }
    }

    #[test]
    fn scores_spanish_reviews() {
        let s = LexiconScorer::new();
        assert!(s.score_text("Las arepas estaban deliciosas").0 > 0);
        assert!(s.score_text("Pésimo servicio, muy lento").0 < 0);
        assert_eq!(s.score_text("Normal, nada especial").0, 0);
    }

    #[test]
    fn negation_flips_within_window() {
        let s = LexiconScorer::new();
        assert!(s.score_text("no estaba nada rico").0 < 0);
        // Outside the window the negator has no effect.
        assert!(s.score_text("no vine ayer pero hoy rico").0 > 0);
    }

    #[test]
    fn star_scale_boundaries() {
        assert_eq!(LexiconScorer::stars(-9), 1);
        assert_eq!(LexiconScorer::stars(-3), 1);
        assert_eq!(LexiconScorer::stars(-1), 2);
        assert_eq!(LexiconScorer::stars(0), 3);
        assert_eq!(LexiconScorer::stars(2), 4);
        assert_eq!(LexiconScorer::stars(3), 5);
    }

    #[tokio::test]
    async fn rating_model_speaks_star_labels() {
        let m = LexiconRatingModel::new();
        assert_eq!(m.predict("Pésimo servicio, muy lento").await.unwrap(), "1 star");
        assert_eq!(m.predict("Normal, nada especial").await.unwrap(), "3 stars");
        assert_eq!(m.predict("Las arepas estaban deliciosas").await.unwrap(), "5 stars");
    }

    #[tokio::test]
    async fn polarity_model_has_two_answers() {
        let m = LexiconPolarityModel::new();
        assert_eq!(m.predict("muy lento").await.unwrap(), "NEGATIVE");
        assert_eq!(m.predict("Normal, nada especial").await.unwrap(), "POSITIVE");
    }

    #[tokio::test]
    async fn lead_summary_takes_whole_sentences_then_caps() {
        let m = LeadSummarizer::new();
        let text = "Arepa rica. Servicio lento pero amable. Volveré pronto.";
        assert_eq!(m.summarize(text, &params(3, 40)).await.unwrap(), "Arepa rica. Servicio lento pero amable.");
        assert_eq!(m.summarize(text, &params(3, 4)).await.unwrap(), "Arepa rica. Servicio lento");
        assert!(m.summarize("   ", &params(3, 4)).await.is_err());
    }
}
