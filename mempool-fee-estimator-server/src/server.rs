use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

use crate::{
    api::{
        get_convert, get_fee_for_target, get_fees, post_block, post_included, post_mempool_info,
    },
    service::FeeTracker,
};

/// Create the Axum application router
pub fn create_app(tracker: Arc<FeeTracker>) -> Router {
    Router::new()
        // Ingest endpoints fed by the mempool and the chain
        .route("/mempool/info", post(post_mempool_info))
        .route("/mempool/included", post(post_included))
        .route("/blocks", post(post_block))
        // Fee estimation endpoints
        .route("/fees", get(get_fees))
        .route("/fees/target/:num_blocks", get(get_fee_for_target))
        .route("/convert", get(get_convert))
        // Health check endpoint
        .route("/health", get(health_check))
        // Add shared state
        .with_state(tracker)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Run the HTTP server
pub async fn run_server(app: Router, host: String, port: u16) -> Result<(), std::io::Error> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("HTTP server listening on http://{}", addr);
    info!("API endpoints:");
    info!("  POST /mempool/info - Latest mempool snapshot");
    info!("  POST /mempool/included - Included items");
    info!("  POST /blocks - New block height");
    info!("  GET /fees?target_times={{secs,..}}&cost={{cost}} - Estimates for time targets");
    info!("  GET /fees/target/{{num_blocks}} - Estimate for a block target");
    info!("  GET /convert?amount={{xch}}&cost={{cost}} - XCH over cost to mojo/cost");
    info!("  GET /health - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(std::io::Error::other)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }

    info!("Received shutdown signal, shutting down gracefully...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, Request};
    use mempool_fee_estimator::{FeeEstimator, FeeLedger};
    use tower::ServiceExt;

    fn create_test_app() -> Router {
        let tracker = Arc::new(FeeTracker::new(FeeEstimator::new(), FeeLedger::new(), 0));
        create_app(tracker)
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_test_app();

        let request = Request::builder()
            .method(Method::GET)
            .uri("/health")
            .body(axum::body::Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_fees_endpoint_exists() {
        let app = create_test_app();

        let request = Request::builder()
            .method(Method::GET)
            .uri("/fees")
            .body(axum::body::Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        // Will return 503 (no snapshot) but endpoint exists
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_ingest_requires_post() {
        let app = create_test_app();

        let request = Request::builder()
            .method(Method::GET)
            .uri("/blocks")
            .body(axum::body::Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
