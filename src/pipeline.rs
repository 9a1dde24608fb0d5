// src/pipeline.rs
//! Pipeline facade: one object wiring the normalizer, classifier, summarizer
//! and report builder over a shared set of model handles.

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::ingest::Comment;
use crate::models::ModelHandles;
use crate::normalize::TextNormalizer;
use crate::report::{CorpusReport, ReportBuilder};
use crate::sentiment::{ClassifierMode, SentimentClassifier, SentimentLabel};
use crate::summarize::{SummaryResult, Summarizer};

/// Ad-hoc single-comment result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAnalysis {
    pub sentiment: SentimentLabel,
    pub summary: SummaryResult,
}

#[derive(Clone)]
pub struct OpinionPipeline {
    classifier: SentimentClassifier,
    summarizer: Summarizer,
    reports: ReportBuilder,
}

impl OpinionPipeline {
    pub fn new(
        normalizer: TextNormalizer,
        classifier: SentimentClassifier,
        summarizer: Summarizer,
        top_terms: usize,
        word_cloud_terms: usize,
    ) -> Self {
        let reports = ReportBuilder::new(classifier.clone(), normalizer, top_terms, word_cloud_terms);
        Self {
            classifier,
            summarizer,
            reports,
        }
    }

    /// Wire adapters around already-initialized handles.
    pub fn from_config(cfg: &PipelineConfig, handles: &ModelHandles) -> Self {
        let classifier = SentimentClassifier::new(
            handles.classifier.clone(),
            cfg.classifier_mode,
            cfg.classify_max_chars,
            cfg.model_timeout(),
        );
        let summarizer = Summarizer::new(
            handles.summarizer.clone(),
            cfg.summary_min_tokens,
            cfg.summary_max_tokens,
            cfg.summarize_max_chars,
            cfg.model_timeout(),
        );
        Self::new(
            TextNormalizer::new(cfg.language),
            classifier,
            summarizer,
            cfg.top_terms,
            cfg.word_cloud_terms,
        )
    }

    pub fn mode(&self) -> ClassifierMode {
        self.classifier.mode()
    }

    pub fn labels(&self) -> &'static [SentimentLabel] {
        self.classifier.labels()
    }

    pub async fn classify(&self, text: &str) -> Result<SentimentLabel> {
        self.classifier.classify(text).await
    }

    pub async fn summarize(&self, text: &str) -> Result<SummaryResult> {
        self.summarizer.summarize(text).await
    }

    pub async fn build_report(&self, comments: &[Comment]) -> Result<CorpusReport> {
        self.reports.build(comments).await
    }

    /// Validate, then classify and summarize one comment. Blank text fails
    /// with `EmptyInput` before any model is called.
    pub async fn analyze_comment(&self, text: &str) -> Result<CommentAnalysis> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        let sentiment = self.classifier.classify(text).await?;
        let summary = self.summarizer.summarize(text).await?;
        Ok(CommentAnalysis { sentiment, summary })
    }
}
