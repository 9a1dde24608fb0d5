// src/config/pipeline.rs
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{env, fs, path::Path, path::PathBuf};

use crate::normalize::Language;
use crate::sentiment::{ClassifierMode, DEFAULT_CLASSIFY_MAX_CHARS};
use crate::summarize::{
    DEFAULT_SUMMARIZE_MAX_CHARS, DEFAULT_SUMMARY_MAX_TOKENS, DEFAULT_SUMMARY_MIN_TOKENS,
};

// --- env defaults & names ---
pub const DEFAULT_PIPELINE_CONFIG_PATH: &str = "config/pipeline.toml";
pub const ENV_PIPELINE_CONFIG_PATH: &str = "OPINION_CONFIG_PATH";
pub const ENV_CLASSIFIER_MODE: &str = "OPINION_CLASSIFIER_MODE";
pub const ENV_LANGUAGE: &str = "OPINION_LANGUAGE";
pub const ENV_BACKEND: &str = "OPINION_BACKEND";
pub const ENV_TOP_TERMS: &str = "OPINION_TOP_TERMS";
pub const ENV_HF_API_TOKEN: &str = "HF_API_TOKEN";

pub const DEFAULT_TOP_TERMS: usize = 10;
pub const DEFAULT_WORD_CLOUD_TERMS: usize = 100;
pub const DEFAULT_MODEL_TIMEOUT_MS: u64 = 30_000;

/// Which family of model backends serves the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Offline lexicon rating + lead summarizer.
    #[default]
    Lexicon,
    /// Remote Hugging Face Inference API.
    #[serde(alias = "hf")]
    HuggingFace,
}

impl std::str::FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexicon" | "local" => Ok(Backend::Lexicon),
            "huggingface" | "hf" => Ok(Backend::HuggingFace),
            other => anyhow::bail!("unsupported backend: {other}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HuggingFaceConfig {
    pub base_url: String,
    /// "ENV" means: read from HF_API_TOKEN
    pub api_token: String,
    /// 5-level star rating model (ordinal mode).
    pub rating_model: String,
    /// Two-class polarity model (binary mode).
    pub polarity_model: String,
    pub summary_model: String,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-inference.huggingface.co/models".to_string(),
            api_token: "ENV".to_string(),
            rating_model: "nlptown/bert-base-multilingual-uncased-sentiment".to_string(),
            polarity_model: "distilbert-base-uncased-finetuned-sst-2-english".to_string(),
            summary_model: "facebook/bart-large-cnn".to_string(),
        }
    }
}

/// Startup configuration. Every field is fixed for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub language: Language,
    pub classifier_mode: ClassifierMode,
    pub backend: Backend,
    /// Classification input bound in characters. Longer text is cut (lossy).
    pub classify_max_chars: usize,
    /// Summarization input bound in characters. Longer text is cut (lossy).
    pub summarize_max_chars: usize,
    pub summary_min_tokens: u32,
    pub summary_max_tokens: u32,
    pub top_terms: usize,
    pub word_cloud_terms: usize,
    pub model_timeout_ms: u64,
    pub huggingface: HuggingFaceConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            language: Language::Spanish,
            classifier_mode: ClassifierMode::Ordinal,
            backend: Backend::Lexicon,
            classify_max_chars: DEFAULT_CLASSIFY_MAX_CHARS,
            summarize_max_chars: DEFAULT_SUMMARIZE_MAX_CHARS,
            summary_min_tokens: DEFAULT_SUMMARY_MIN_TOKENS,
            summary_max_tokens: DEFAULT_SUMMARY_MAX_TOKENS,
            top_terms: DEFAULT_TOP_TERMS,
            word_cloud_terms: DEFAULT_WORD_CLOUD_TERMS,
            model_timeout_ms: DEFAULT_MODEL_TIMEOUT_MS,
            huggingface: HuggingFaceConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn model_timeout(&self) -> Duration {
        Duration::from_millis(self.model_timeout_ms)
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let cfg: PipelineConfig = toml::from_str(s).context("parsing pipeline config")?;
        Ok(cfg)
    }

    /// Load, apply env overrides, sanitize and resolve secrets.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config from {}", path.display()))?;
        let mut cfg = Self::from_toml_str(&data)?;
        cfg.finish()?;
        Ok(cfg)
    }

    /// Resolve the config path:
    /// 1) $OPINION_CONFIG_PATH (must exist)
    /// 2) config/pipeline.toml
    /// 3) built-in defaults
    pub fn from_env() -> anyhow::Result<Self> {
        if let Ok(p) = env::var(ENV_PIPELINE_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_PIPELINE_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            return Self::load_from_file(&pb);
        }
        let default_path = PathBuf::from(DEFAULT_PIPELINE_CONFIG_PATH);
        if default_path.exists() {
            return Self::load_from_file(&default_path);
        }
        let mut cfg = Self::default();
        cfg.finish()?;
        Ok(cfg)
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.apply_env_overrides()?;
        self.sanitize();
        self.resolve_token()
    }

    fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(v) = env::var(ENV_CLASSIFIER_MODE) {
            self.classifier_mode = v.parse()?;
        }
        if let Ok(v) = env::var(ENV_LANGUAGE) {
            self.language = v.parse()?;
        }
        if let Ok(v) = env::var(ENV_BACKEND) {
            self.backend = v.parse()?;
        }
        if let Ok(v) = env::var(ENV_TOP_TERMS) {
            self.top_terms = v
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TOP_TERMS} must be a non-negative integer"))?;
        }
        Ok(())
    }

    /// Keep bounds usable even if the file is odd.
    pub fn sanitize(&mut self) {
        if self.classify_max_chars == 0 {
            self.classify_max_chars = DEFAULT_CLASSIFY_MAX_CHARS;
        }
        if self.summarize_max_chars == 0 {
            self.summarize_max_chars = DEFAULT_SUMMARIZE_MAX_CHARS;
        }
        if self.summary_max_tokens == 0 {
            self.summary_max_tokens = DEFAULT_SUMMARY_MAX_TOKENS;
        }
        if self.summary_min_tokens > self.summary_max_tokens {
            // swap to keep a valid interval
            std::mem::swap(&mut self.summary_min_tokens, &mut self.summary_max_tokens);
        }
        if self.model_timeout_ms == 0 {
            self.model_timeout_ms = DEFAULT_MODEL_TIMEOUT_MS;
        }
    }

    fn resolve_token(&mut self) -> anyhow::Result<()> {
        if self.backend != Backend::HuggingFace {
            return Ok(());
        }
        let hf = &mut self.huggingface;
        if hf.api_token.trim().eq_ignore_ascii_case("env") {
            hf.api_token = env::var(ENV_HF_API_TOKEN)
                .map_err(|_| anyhow!("Missing {ENV_HF_API_TOKEN} env var"))?;
        }
        Ok(())
    }
}
