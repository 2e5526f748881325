//! Authentication middleware for admin endpoints

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

pub const METRICS_TOKEN_HEADER: &str = "x-metrics-token";

/// Rejects admin requests whose `x-metrics-token` does not match the configured token.
///
/// With no token configured the admin endpoints stay closed.
pub async fn admin_auth(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = app_state.config.metrics_auth_token.as_deref() else {
        info!("Admin request rejected: METRICS_AUTH_TOKEN is not configured");
        return Err(AppError::Unauthorized);
    };

    let provided = extract_token(&headers)?;
    if provided != expected {
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

pub fn extract_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(METRICS_TOKEN_HEADER)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::BadRequest("malformed metrics token".to_string()))
}
