//! API handlers and shared request utilities.

pub mod auth;
pub mod carousel;
pub mod health;
pub mod jobs;
pub mod resumes;
pub mod root;
pub mod settings;

use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use regex::Regex;
use std::sync::Arc;

use crate::auth::provider::{AuthApi, AuthUser};
use crate::auth::AuthState;
use crate::i18n::Lang;

/// Lightweight email sanity check used before persisting data.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Language for user-facing messages, from `Accept-Language`.
pub(crate) fn request_lang(headers: &HeaderMap) -> Lang {
    headers
        .get("accept-language")
        .and_then(|value| value.to_str().ok())
        .map(Lang::from_accept_language)
        .unwrap_or_default()
}

pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Resolve the bearer token to the provider's user, or a 401.
pub(crate) async fn authenticate(
    headers: &HeaderMap,
    auth_state: &Arc<AuthState>,
) -> Result<AuthUser, (StatusCode, String)> {
    let Some(token) = extract_bearer_token(headers) else {
        return Err((
            StatusCode::UNAUTHORIZED,
            "Missing bearer token".to_string(),
        ));
    };
    auth_state
        .provider()
        .get_user(&token)
        .await
        .map_err(|_| (StatusCode::UNAUTHORIZED, "Invalid session".to_string()))
}

/// Like [`authenticate`], but the account must be on the admin allow-list.
pub(crate) async fn require_admin(
    headers: &HeaderMap,
    auth_state: &Arc<AuthState>,
) -> Result<AuthUser, (StatusCode, String)> {
    let user = authenticate(headers, auth_state).await?;
    if auth_state.config().policy().is_admin(&user.email) {
        Ok(user)
    } else {
        Err((StatusCode::FORBIDDEN, "Admin access only".to_string()))
    }
}
