// src/metrics.rs
use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and describe pipeline series.
    /// Call once per process.
    pub fn init() -> anyhow::Result<Self> {
        // Use default buckets to avoid API differences across crate versions.
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_counter!(
            "opinion_classifications_total",
            "Comments classified, by normalized label."
        );
        describe_counter!(
            "opinion_model_errors_total",
            "Model calls that failed, timed out or returned unknown output."
        );
        describe_counter!("opinion_reports_total", "Corpus reports built.");
        describe_histogram!(
            "opinion_model_call_ms",
            "Model call latency in milliseconds, by capability."
        );

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
