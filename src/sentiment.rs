// src/sentiment.rs
//! Sentiment classifier adapter.
//!
//! Two label-set shapes are supported behind one interface:
//! - `Ordinal`: the backend answers with a 1–5 star level
//!   (1–2 → Negative, 3 → Neutral, 4–5 → Positive).
//! - `Binary`: the backend answers negative/positive; there is no Neutral.
//!
//! Each shape is a [`LabelScheme`] declaring its own labels and its own
//! mapping. Unknown backend labels are an error, never a guess.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::models::{anon_id, truncate_chars, DynClassificationModel};

/// Default classification truncation bound, in characters.
pub const DEFAULT_CLASSIFY_MAX_CHARS: usize = 512;

/// Normalized sentiment. Ordering is the display order used for counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment-time choice of classifier shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    #[default]
    Ordinal,
    Binary,
}

impl ClassifierMode {
    pub fn scheme(self) -> &'static dyn LabelScheme {
        match self {
            ClassifierMode::Ordinal => &OrdinalScheme,
            ClassifierMode::Binary => &BinaryScheme,
        }
    }

    pub fn labels(self) -> &'static [SentimentLabel] {
        self.scheme().labels()
    }
}

impl fmt::Display for ClassifierMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierMode::Ordinal => f.write_str("ordinal"),
            ClassifierMode::Binary => f.write_str("binary"),
        }
    }
}

impl FromStr for ClassifierMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ordinal" | "stars" | "rating" => Ok(ClassifierMode::Ordinal),
            "binary" | "polarity" => Ok(ClassifierMode::Binary),
            other => anyhow::bail!("unsupported classifier mode: {other}"),
        }
    }
}

/// One label-set shape: which labels exist and how native output maps onto them.
pub trait LabelScheme: Send + Sync + fmt::Debug {
    fn mode(&self) -> ClassifierMode;
    /// Active labels in display order.
    fn labels(&self) -> &'static [SentimentLabel];
    /// `None` when the backend label is not part of this scheme.
    fn map_label(&self, raw: &str) -> Option<SentimentLabel>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OrdinalScheme;

impl OrdinalScheme {
    /// Parse `"1 star"`, `"4 stars"` or a bare `"4"` into a 1..=5 level.
    pub fn parse_level(raw: &str) -> Option<u8> {
        let s = raw.trim().to_ascii_lowercase();
        let digits = s
            .strip_suffix("stars")
            .or_else(|| s.strip_suffix("star"))
            .unwrap_or(&s)
            .trim();
        match digits.parse::<u8>() {
            Ok(n @ 1..=5) => Some(n),
            _ => None,
        }
    }
}

impl LabelScheme for OrdinalScheme {
    fn mode(&self) -> ClassifierMode {
        ClassifierMode::Ordinal
    }

    fn labels(&self) -> &'static [SentimentLabel] {
        &[
            SentimentLabel::Positive,
            SentimentLabel::Neutral,
            SentimentLabel::Negative,
        ]
    }

    fn map_label(&self, raw: &str) -> Option<SentimentLabel> {
        match Self::parse_level(raw)? {
            1 | 2 => Some(SentimentLabel::Negative),
            3 => Some(SentimentLabel::Neutral),
            _ => Some(SentimentLabel::Positive),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryScheme;

impl LabelScheme for BinaryScheme {
    fn mode(&self) -> ClassifierMode {
        ClassifierMode::Binary
    }

    fn labels(&self) -> &'static [SentimentLabel] {
        &[SentimentLabel::Positive, SentimentLabel::Negative]
    }

    fn map_label(&self, raw: &str) -> Option<SentimentLabel> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "negative" | "neg" | "label_0" => Some(SentimentLabel::Negative),
            "positive" | "pos" | "label_1" => Some(SentimentLabel::Positive),
            _ => None,
        }
    }
}

/// Adapter over a shared classification backend.
#[derive(Clone)]
pub struct SentimentClassifier {
    model: DynClassificationModel,
    scheme: &'static dyn LabelScheme,
    max_chars: usize,
    timeout: Duration,
}

impl SentimentClassifier {
    pub fn new(
        model: DynClassificationModel,
        mode: ClassifierMode,
        max_chars: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            model,
            scheme: mode.scheme(),
            max_chars,
            timeout,
        }
    }

    pub fn mode(&self) -> ClassifierMode {
        self.scheme.mode()
    }

    /// Labels this classifier can ever return. Known at construction time.
    pub fn labels(&self) -> &'static [SentimentLabel] {
        self.scheme.labels()
    }

    /// Classify `text`. Input longer than `max_chars` is truncated first.
    pub async fn classify(&self, text: &str) -> Result<SentimentLabel> {
        if text.trim().is_empty() {
            return Err(PipelineError::ClassificationUnavailable(
                "blank text cannot be classified".into(),
            ));
        }
        let input = truncate_chars(text, self.max_chars);

        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.model.predict(input)).await;
        histogram!("opinion_model_call_ms", "capability" => "classify")
            .record(started.elapsed().as_secs_f64() * 1000.0);

        let raw = match outcome {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                return Err(self.unavailable(text, format!("{}: {e}", self.model.name())));
            }
            Err(_) => {
                return Err(self.unavailable(
                    text,
                    format!(
                        "{} timed out after {}ms",
                        self.model.name(),
                        self.timeout.as_millis()
                    ),
                ));
            }
        };

        let label = self.scheme.map_label(&raw).ok_or_else(|| {
            self.unavailable(
                text,
                format!(
                    "{} returned unrecognized label `{raw}` for {} mode",
                    self.model.name(),
                    self.mode()
                ),
            )
        })?;

        debug!(id = %anon_id(text), raw = %raw, label = %label, "classified");
        counter!("opinion_classifications_total", "label" => label.as_str()).increment(1);
        Ok(label)
    }

    fn unavailable(&self, text: &str, msg: String) -> PipelineError {
        warn!(id = %anon_id(text), error = %msg, "classification unavailable");
        counter!("opinion_model_errors_total", "capability" => "classify").increment(1);
        PipelineError::ClassificationUnavailable(msg)
    }
}
