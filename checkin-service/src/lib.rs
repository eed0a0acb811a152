pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    extract::State,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::CheckinConfig;
use crate::services::{GeoProvider, Ledger, TokenAuthority};
use service_core::middleware::{
    metrics::metrics_middleware, rate_limit::ip_rate_limit_middleware,
    rate_limit::IpRateLimiter, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: CheckinConfig,
    pub tokens: Arc<TokenAuthority>,
    pub ledger: Arc<dyn Ledger>,
    pub geo: Arc<dyn GeoProvider>,
    pub checkin_rate_limiter: IpRateLimiter,
    pub ip_rate_limiter: IpRateLimiter,
}

pub fn build_router(state: AppState) -> Router {
    // Admin routes sit behind the admin API key
    let admin_routes = Router::new()
        .route("/admin/data", get(handlers::admin::admin_data))
        .route("/admin/export/csv", get(handlers::export::export_csv))
        .route(
            "/admin/token/invalidate",
            post(handlers::token::invalidate_token),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::admin_auth_middleware,
        ));

    // Check-in route with its own, tighter rate limit
    let checkin_limiter = state.checkin_rate_limiter.clone();
    let checkin_route = Router::new()
        .route("/checkin", post(handlers::checkin::submit_checkin))
        .layer(from_fn_with_state(checkin_limiter, ip_rate_limit_middleware));

    let ip_limiter = state.ip_rate_limiter.clone();

    let cors_origins: Vec<axum::http::HeaderValue> = state
        .config
        .security
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", origin, e);
                None
            }
        })
        .collect();

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route("/api/token", get(handlers::token::current_token))
        .merge(checkin_route)
        .merge(admin_routes)
        .with_state(state)
        // Global IP rate limiting
        .layer(from_fn_with_state(ip_limiter, ip_rate_limit_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(cors_origins)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::HeaderName::from_static("x-admin-api-key"),
                ]),
        )
}

/// Service health check; folds in the ledger store.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.ledger.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": state.config.service_name,
                "version": state.config.service_version,
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": state.config.service_name,
                "error": e.to_string(),
            })),
        ),
    }
}
