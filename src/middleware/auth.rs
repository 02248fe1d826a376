// SPDX-License-Identifier: MIT

//! Session authentication middleware (the authorization gate).
//!
//! Layered onto `/api/*` only; public routes never pass through it.
//! A valid session binds a typed [`AuthUser`] into the request
//! extensions for downstream handlers.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "teamscore_session";

/// Authenticated user resolved from the session cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Middleware that requires a valid session.
///
/// Rejection emits the standard 401 envelope and leaves any existing
/// session untouched.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(AppError::Unauthorized)?;

    let user_id = state
        .sessions
        .resolve(&token)
        .await?
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}
