//! API routes.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{
    analyze_additional, analyze_critical, analyze_only, analyze_video, cache_stats, clear_cache,
    delete_history, get_result, get_transcript, health, list_history, list_perspectives, ready,
    root,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // Routes that call the model or yt-dlp get the stricter limiter
    let analyze_limiter = Arc::new(RateLimiterCache::new(state.config.analyze_rate_limit_rps));
    let api_limiter = Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let analyze_routes = Router::new()
        .route("/analyze", post(analyze_video))
        .route("/analyze/critical", post(analyze_critical))
        .route("/analyze/additional", post(analyze_additional))
        .route("/analyze-only", post(analyze_only))
        .route("/transcript/:video_id", get(get_transcript))
        .layer(middleware::from_fn_with_state(
            analyze_limiter,
            rate_limit_middleware,
        ));

    let record_routes = Router::new()
        .route("/perspectives", get(list_perspectives))
        .route("/result/:analysis_id", get(get_result))
        .route("/history", get(list_history))
        .route("/history/:analysis_id", delete(delete_history))
        .route("/cache/stats", get(cache_stats))
        .route("/cache", delete(clear_cache));

    let api_routes = Router::new()
        .merge(analyze_routes)
        .merge(record_routes)
        .layer(middleware::from_fn_with_state(
            api_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
