// src/bootstrap.rs
use crate::config::PipelineConfig;
use crate::models::ModelHandles;
use crate::pipeline::OpinionPipeline;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything built once at startup. Dropped at shutdown; nothing is rebuilt.
pub struct PipelineRuntime {
    pub pipeline: Arc<OpinionPipeline>,
}

impl PipelineRuntime {
    /// Resolve config via `OPINION_CONFIG_PATH` / `config/pipeline.toml` / defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let cfg = PipelineConfig::from_env()?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: PipelineConfig) -> anyhow::Result<Self> {
        // Safe diagnostics only: never log the token itself.
        info!(
            "pipeline cfg loaded: backend={:?}, mode={}, language={}, token_len={}",
            cfg.backend,
            cfg.classifier_mode,
            cfg.language,
            cfg.huggingface.api_token.len()
        );
        let handles = ModelHandles::from_config(&cfg)?;
        let pipeline = Arc::new(OpinionPipeline::from_config(&cfg, &handles));
        Ok(Self { pipeline })
    }

    /// One-off smoke call against the configured backends. Logs, never fails.
    pub async fn quick_probe(&self) {
        let sample = "Las arepas estaban deliciosas, pero la espera fue larga.";
        match self.pipeline.analyze_comment(sample).await {
            Ok(out) => info!(sentiment = %out.sentiment, "pipeline quick_probe ok"),
            Err(e) => warn!(error = %e, "pipeline quick_probe failed"),
        }
    }
}
