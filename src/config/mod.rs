// src/config/mod.rs
//! Startup configuration (TOML file + env overrides).

pub mod pipeline;

pub use pipeline::{Backend, HuggingFaceConfig, PipelineConfig};
