// src/report.rs
//! Corpus report builder.
//!
//! Order of work for one batch:
//! 0) reject blank comments (`MalformedInput`, no model called)
//! 1) classify every comment in input order (first failure aborts the batch)
//! 2) zero-filled counts over the active label set, then increment
//! 3) normalize the space-joined corpus and rank its terms
//!
//! In binary mode the Neutral bucket is absent from the counts, not zero.

use std::collections::BTreeMap;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::frequency::{term_counts, TermFrequencyEntry};
use crate::ingest::{self, Comment};
use crate::normalize::TextNormalizer;
use crate::sentiment::{SentimentClassifier, SentimentLabel};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub sentiment: SentimentLabel,
}

/// Label → count over exactly the active label set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentCounts(BTreeMap<SentimentLabel, usize>);

impl SentimentCounts {
    /// Every label present at zero.
    pub fn zeroed(labels: &[SentimentLabel]) -> Self {
        Self(labels.iter().map(|l| (*l, 0)).collect())
    }

    pub fn increment(&mut self, label: SentimentLabel) {
        *self.0.entry(label).or_insert(0) += 1;
    }

    /// `None` when the label is outside the active set.
    pub fn get(&self, label: SentimentLabel) -> Option<usize> {
        self.0.get(&label).copied()
    }

    pub fn contains(&self, label: SentimentLabel) -> bool {
        self.0.contains_key(&label)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SentimentLabel, usize)> + '_ {
        self.0.iter().map(|(l, c)| (*l, *c))
    }

    /// Percentage share per label (pie chart). All zero for an empty batch.
    pub fn shares(&self) -> BTreeMap<SentimentLabel, f64> {
        let total = self.total();
        self.0
            .iter()
            .map(|(l, c)| {
                let pct = if total == 0 {
                    0.0
                } else {
                    (*c as f64) * 100.0 / (total as f64)
                };
                (*l, pct)
            })
            .collect()
    }
}

/// Aggregate result for one batch. Built fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusReport {
    pub total: usize,
    /// Active label set in display order.
    pub labels: Vec<SentimentLabel>,
    pub comments: Vec<ClassifiedComment>,
    pub sentiment_counts: SentimentCounts,
    pub sentiment_shares: BTreeMap<SentimentLabel, f64>,
    pub top_terms: Vec<TermFrequencyEntry>,
    /// Ranked term weights for a word-cloud renderer.
    pub word_cloud: Vec<TermFrequencyEntry>,
}

#[derive(Clone)]
pub struct ReportBuilder {
    classifier: SentimentClassifier,
    normalizer: TextNormalizer,
    top_terms: usize,
    word_cloud_terms: usize,
}

impl ReportBuilder {
    pub fn new(
        classifier: SentimentClassifier,
        normalizer: TextNormalizer,
        top_terms: usize,
        word_cloud_terms: usize,
    ) -> Self {
        Self {
            classifier,
            normalizer,
            top_terms,
            word_cloud_terms,
        }
    }

    pub async fn build(&self, comments: &[Comment]) -> Result<CorpusReport> {
        let labels = self.classifier.labels();

        // Input errors abort before the first model call.
        if let Some(i) = comments.iter().position(|c| c.text.trim().is_empty()) {
            return Err(ingest::blank_record(i));
        }

        // (1) Classify in input order; `?` aborts the whole batch.
        let mut classified = Vec::with_capacity(comments.len());
        for comment in comments {
            let sentiment = self.classifier.classify(&comment.text).await?;
            classified.push(ClassifiedComment {
                comment: comment.clone(),
                sentiment,
            });
        }

        // (2) Counts over the active label set.
        let mut counts = SentimentCounts::zeroed(labels);
        for c in &classified {
            counts.increment(c.sentiment);
        }

        // (3) Corpus term frequencies.
        let corpus = comments
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let ranked = term_counts(self.normalizer.normalize(&corpus));
        let top_terms: Vec<TermFrequencyEntry> =
            ranked.iter().take(self.top_terms).cloned().collect();
        let mut word_cloud = ranked;
        word_cloud.truncate(self.word_cloud_terms);

        if top_terms.is_empty() {
            debug!("corpus produced no terms after normalization");
        }
        info!(
            comments = classified.len(),
            terms = top_terms.len(),
            mode = %self.classifier.mode(),
            "corpus report built"
        );
        counter!("opinion_reports_total").increment(1);

        Ok(CorpusReport {
            total: classified.len(),
            labels: labels.to_vec(),
            comments: classified,
            sentiment_shares: counts.shares(),
            sentiment_counts: counts,
            top_terms,
            word_cloud,
        })
    }
}
