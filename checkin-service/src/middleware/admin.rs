use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use secrecy::ExposeSecret;
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::AppState;

pub const ADMIN_KEY_HEADER: &str = "x-admin-api-key";

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let presented = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    let expected = state.config.security.admin_api_key.expose_secret();
    let authorized: bool = presented.as_bytes().ct_eq(expected.as_bytes()).into();

    if authorized {
        next.run(request).await
    } else {
        tracing::warn!("Failed admin authentication attempt");
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized: invalid or missing admin API key" })),
        )
            .into_response()
    }
}
