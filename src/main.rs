//! Opinion analytics service: binary entrypoint.
//! Boots the Axum HTTP server with the pipeline routes and `/metrics`.

use opinion_analytics::api::{self, AppState};
use opinion_analytics::bootstrap::PipelineRuntime;
use opinion_analytics::metrics::Metrics;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; `OPINION_LOG_JSON=1` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("opinion_analytics=info,warn"));
    let json = std::env::var("OPINION_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    // The deployment runtime may already own the global subscriber.
    let _ = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    // Models are built exactly once here and shared by every request.
    let runtime = PipelineRuntime::from_env()?;
    runtime.quick_probe().await;

    let metrics = Metrics::init()?;
    let router = api::router(AppState::new(runtime.pipeline.clone())).merge(metrics.router());

    Ok(router.into())
}
