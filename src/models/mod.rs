// src/models/mod.rs
//! Model backends: the underlying sentiment and summarization capabilities.
//!
//! Backends are heavyweight, so they are built once at startup
//! ([`ModelHandles::from_config`]) and shared by `Arc` with every adapter.
//! A backend only returns its *native* output (e.g. `"4 stars"`); mapping to the
//! normalized taxonomy happens in [`crate::sentiment`].

pub mod huggingface;
pub mod lexicon;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::config::{Backend, PipelineConfig};
use crate::sentiment::ClassifierMode;

/// A text classifier returning its native top label.
#[async_trait]
pub trait TextClassificationModel: Send + Sync {
    async fn predict(&self, input: &str) -> anyhow::Result<String>;
    /// Backend/model name for diagnostics.
    fn name(&self) -> &str;
}

/// Generation bounds forwarded to the summarization backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryParams {
    pub min_tokens: u32,
    pub max_tokens: u32,
    /// Always `false` in the pipeline; sampling would break idempotence.
    pub do_sample: bool,
}

#[async_trait]
pub trait SummarizationModel: Send + Sync {
    async fn summarize(&self, input: &str, params: &SummaryParams) -> anyhow::Result<String>;
    fn name(&self) -> &str;
}

pub type DynClassificationModel = Arc<dyn TextClassificationModel>;
pub type DynSummarizationModel = Arc<dyn SummarizationModel>;

/// Process-wide model handles. Construct once, clone the `Arc`s into adapters.
#[derive(Clone)]
pub struct ModelHandles {
    pub classifier: DynClassificationModel,
    pub summarizer: DynSummarizationModel,
}

impl ModelHandles {
    pub fn new(classifier: DynClassificationModel, summarizer: DynSummarizationModel) -> Self {
        Self {
            classifier,
            summarizer,
        }
    }

    /// Build the backend pair selected by `cfg.backend` for `cfg.classifier_mode`.
    pub fn from_config(cfg: &PipelineConfig) -> anyhow::Result<Self> {
        let handles = match cfg.backend {
            Backend::Lexicon => {
                let classifier: DynClassificationModel = match cfg.classifier_mode {
                    ClassifierMode::Ordinal => Arc::new(lexicon::LexiconRatingModel::new()),
                    ClassifierMode::Binary => Arc::new(lexicon::LexiconPolarityModel::new()),
                };
                Self::new(classifier, Arc::new(lexicon::LeadSummarizer::new()))
            }
            Backend::HuggingFace => {
                let hf = &cfg.huggingface;
                let client = huggingface::InferenceClient::new(&hf.base_url, &hf.api_token)?;
                let model_id = match cfg.classifier_mode {
                    ClassifierMode::Ordinal => hf.rating_model.as_str(),
                    ClassifierMode::Binary => hf.polarity_model.as_str(),
                };
                let classifier = huggingface::HfTextClassifier::new(client.clone(), model_id);
                let summarizer = huggingface::HfSummarizer::new(client, &hf.summary_model);
                Self::new(Arc::new(classifier), Arc::new(summarizer))
            }
        };
        info!(
            backend = ?cfg.backend,
            mode = %cfg.classifier_mode,
            classifier = handles.classifier.name(),
            summarizer = handles.summarizer.name(),
            "model handles initialized"
        );
        Ok(handles)
    }
}

/// Keep at most `max_chars` characters. Lossy: anything past the bound is
/// silently dropped before the text reaches a model.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Short, non-reversible id for log lines. Raw comment text is never logged.
pub(crate) fn anon_id(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
