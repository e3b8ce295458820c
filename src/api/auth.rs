use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::error::{AppError, Result};

/// Axum middleware that resolves the caller's session before any handler runs.
///
/// The token is read from `Authorization: Bearer <token>` or, failing that,
/// from the configured session cookie. The resolved [`crate::models::User`]
/// is inserted into request extensions; unresolvable sessions get 401.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response> {
    let token = extract_session_token(req.headers(), &state.session_cookie).ok_or_else(|| {
        AppError::Authentication("Missing session token".to_string())
    })?;

    let user = state
        .permissions
        .authenticate(&token)
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid or expired session".to_string()))?;

    tracing::debug!(user_id = user.id, path = %req.uri().path(), "Session resolved");
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Extract the session token from request headers.
fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
