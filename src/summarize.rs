// src/summarize.rs
//! Summarizer adapter: bounded input, bounded deterministic output.

use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::models::{anon_id, truncate_chars, DynSummarizationModel, SummaryParams};

/// Default summarization truncation bound, in characters.
pub const DEFAULT_SUMMARIZE_MAX_CHARS: usize = 1024;
pub const DEFAULT_SUMMARY_MIN_TOKENS: u32 = 10;
pub const DEFAULT_SUMMARY_MAX_TOKENS: u32 = 40;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub text: String,
}

#[derive(Clone)]
pub struct Summarizer {
    model: DynSummarizationModel,
    params: SummaryParams,
    max_chars: usize,
    timeout: Duration,
}

impl Summarizer {
    /// `min_tokens`/`max_tokens` bound the generated summary; sampling is
    /// always disabled so identical input yields identical output.
    pub fn new(
        model: DynSummarizationModel,
        min_tokens: u32,
        max_tokens: u32,
        max_chars: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            model,
            params: SummaryParams {
                min_tokens,
                max_tokens,
                do_sample: false,
            },
            max_chars,
            timeout,
        }
    }

    pub async fn summarize(&self, text: &str) -> Result<SummaryResult> {
        if text.trim().is_empty() {
            return Err(PipelineError::SummarizationUnavailable(
                "blank text has nothing to summarize".into(),
            ));
        }
        let input = truncate_chars(text, self.max_chars);

        let started = Instant::now();
        let outcome =
            tokio::time::timeout(self.timeout, self.model.summarize(input, &self.params)).await;
        histogram!("opinion_model_call_ms", "capability" => "summarize")
            .record(started.elapsed().as_secs_f64() * 1000.0);

        let summary = match outcome {
            Ok(Ok(s)) => s.trim().to_string(),
            Ok(Err(e)) => return Err(self.unavailable(text, format!("{}: {e}", self.model.name()))),
            Err(_) => {
                return Err(self.unavailable(
                    text,
                    format!(
                        "{} timed out after {}ms",
                        self.model.name(),
                        self.timeout.as_millis()
                    ),
                ))
            }
        };

        if summary.is_empty() {
            return Err(self.unavailable(text, format!("{} produced no output", self.model.name())));
        }
        debug!(id = %anon_id(text), chars = summary.chars().count(), "summarized");
        Ok(SummaryResult { text: summary })
    }

    fn unavailable(&self, text: &str, msg: String) -> PipelineError {
        warn!(id = %anon_id(text), error = %msg, "summarization unavailable");
        counter!("opinion_model_errors_total", "capability" => "summarize").increment(1);
        PipelineError::SummarizationUnavailable(msg)
    }
}
