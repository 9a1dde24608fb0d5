// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod frequency;
pub mod ingest;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod sentiment;
pub mod summarize;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::error::PipelineError;
pub use crate::ingest::Comment;
pub use crate::pipeline::{CommentAnalysis, OpinionPipeline};
pub use crate::report::{ClassifiedComment, CorpusReport, SentimentCounts};
pub use crate::sentiment::{ClassifierMode, SentimentLabel};

use tracing::info;

/// Build the full in-process app (pipeline routes without `/metrics`).
/// Config comes from `OPINION_CONFIG_PATH` / `config/pipeline.toml` / defaults.
pub fn app() -> anyhow::Result<axum::Router> {
    let runtime = bootstrap::PipelineRuntime::from_env()?;
    info!(mode = %runtime.pipeline.mode(), "pipeline ready");
    Ok(api::router(api::AppState::new(runtime.pipeline)))
}
