//! HTTP surface for metrics scraping and a liveness check (§4.9).

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::Metrics;

/// Router builder mirroring the shared-state-over-`Arc` pattern used for
/// herald's other HTTP surfaces: one `GET /metrics` endpoint in Prometheus
/// text exposition format, one `GET /health` liveness endpoint that always
/// returns `200 OK` once the process has reached the point of serving HTTP
/// at all.
pub struct MetricsRouter;

impl MetricsRouter {
    pub fn new(metrics: Arc<Metrics>) -> Router {
        Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(metrics)
    }
}

async fn metrics_handler(State(metrics): State<Arc<Metrics>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "application/openmetrics-text; version=1.0.0; charset=utf-8")],
        metrics.encode(),
    )
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_router() {
        let metrics = Arc::new(Metrics::new());
        let _router = MetricsRouter::new(metrics);
    }
}
