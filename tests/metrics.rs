// tests/metrics.rs
// The Prometheus recorder is process-global: one test installs it.

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use opinion_analytics::metrics::Metrics;

#[tokio::test]
async fn metrics_endpoint_reports_pipeline_series() {
    for k in ["OPINION_CONFIG_PATH", "OPINION_CLASSIFIER_MODE", "OPINION_BACKEND"] {
        std::env::remove_var(k);
    }
    let metrics = Metrics::init().expect("install recorder");
    let app = opinion_analytics::app()
        .expect("app() should build Router in tests")
        .merge(metrics.router());

    let r = app
        .clone()
        .oneshot(
            Request::post("/report")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"[{"comentario":"Las arepas estaban deliciosas"},{"comentario":"Pésimo servicio"}]"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(r.status(), StatusCode::OK);

    let m = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(m.status(), StatusCode::OK);
    let body = body::to_bytes(m.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "opinion_reports_total",
        "opinion_classifications_total",
        "opinion_model_call_ms",
    ] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
}
