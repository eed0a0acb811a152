//! Common test utilities for checkin-service integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use checkin_service::config::{
    CheckinConfig, Environment, GeoConfig, LedgerConfig, RateLimitConfig, SecurityConfig,
    TokenConfig,
};
use checkin_service::services::{
    Ledger, LedgerError, MemoryLedger, NoopGeoProvider, TokenAuthority,
};
use checkin_service::{build_router, AppState};
use secrecy::Secret;
use service_core::config::Config as CommonConfig;
use service_core::middleware::rate_limit::create_ip_rate_limiter;
use std::sync::{Arc, Once};
use tower::util::ServiceExt;

pub const ADMIN_KEY: &str = "test-admin-key";

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,checkin_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn test_config(ttl_seconds: i64) -> CheckinConfig {
    CheckinConfig {
        common: CommonConfig { port: 0 },
        environment: Environment::Dev,
        service_name: "checkin-service-test".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        token: TokenConfig { ttl_seconds },
        security: SecurityConfig {
            admin_api_key: Secret::new(ADMIN_KEY.to_string()),
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        ledger: LedgerConfig {
            enabled: false,
            base_url: String::new(),
            api_token: Secret::new(String::new()),
            timeout_seconds: 1,
        },
        geo: GeoConfig {
            enabled: false,
            base_url: String::new(),
            timeout_seconds: 1,
        },
        rate_limit: RateLimitConfig {
            checkin_attempts: 1000,
            checkin_window_seconds: 60,
            global_ip_limit: 1000,
            global_ip_window_seconds: 60,
        },
    }
}

/// Build a router backed by the given ledger.
pub fn app_with_ledger(ledger: Arc<dyn Ledger>, ttl_seconds: i64) -> Router {
    init_tracing();

    let state = AppState {
        config: test_config(ttl_seconds),
        tokens: Arc::new(TokenAuthority::new()),
        ledger,
        geo: Arc::new(NoopGeoProvider),
        checkin_rate_limiter: create_ip_rate_limiter(1000, 60),
        ip_rate_limiter: create_ip_rate_limiter(1000, 60),
    };

    build_router(state)
}

/// Build a router with a fresh in-memory ledger, returning both.
pub fn spawn_app(ttl_seconds: i64) -> (Router, Arc<MemoryLedger>) {
    let ledger = Arc::new(MemoryLedger::new());
    let app = app_with_ledger(ledger.clone(), ttl_seconds);
    (app, ledger)
}

/// Ledger double whose every operation fails, for fail-closed assertions.
pub struct FailingLedger;

#[async_trait::async_trait]
impl Ledger for FailingLedger {
    async fn append(
        &self,
        _record: &checkin_service::models::SubmissionRecord,
    ) -> Result<(), LedgerError> {
        Err(LedgerError::Status(500))
    }

    async fn read_all(
        &self,
    ) -> Result<Vec<checkin_service::models::SubmissionRecord>, LedgerError> {
        Err(LedgerError::Status(500))
    }

    async fn health_check(&self) -> Result<(), LedgerError> {
        Err(LedgerError::Status(500))
    }
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub async fn read_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

/// Fetch the current token value via the public endpoint.
pub async fn fetch_token(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    read_json(response).await["token"]
        .as_str()
        .expect("token missing")
        .to_string()
}

/// POST /checkin with a JSON payload and a forwarded client address.
pub async fn post_checkin(
    app: &Router,
    payload: serde_json::Value,
    forwarded_for: &str,
) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/checkin")
                .header("Content-Type", "application/json")
                .header("X-Forwarded-For", forwarded_for)
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// GET an admin endpoint with the test admin key.
pub async fn admin_get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header("x-admin-api-key", ADMIN_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}
