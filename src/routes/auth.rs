// SPDX-License-Identifier: MIT

//! Google OAuth authentication routes.
//!
//! Login flow: `/auth/google` redirects to Google's consent screen with an
//! HMAC-signed state parameter; `/auth/google/callback` verifies the state,
//! exchanges the code, reconciles the user and establishes a session.
//! Exchange failures land on `/auth/google/failure` with no session created.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AppError, Result};
use crate::middleware::auth::SESSION_COOKIE;
use crate::models::User;
use crate::routes::ApiResponse;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

const SESSION_COOKIE_MAX_AGE_HOURS: i64 = 24;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/google", get(auth_start))
        .route("/auth/google/callback", get(auth_callback))
        .route("/auth/google/failure", get(auth_failure))
        .route("/auth/logout", post(logout))
}

/// Start OAuth flow - redirect to Google authorization.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Redirect> {
    let oauth_state = build_signed_state(&state.config.session_secret)?;
    let callback_url = callback_url_from_headers(&headers, state.config.port);

    tracing::info!(
        client_id = %state.config.google_client_id,
        "Starting OAuth flow, redirecting to Google"
    );

    Ok(Redirect::temporary(
        &state.google.authorize_url(&callback_url, &oauth_state),
    ))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: String,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code, reconcile user, establish session.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Result<Response> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Google");
        return Ok(failure_redirect());
    }

    if !verify_state(&params.state, &state.config.session_secret) {
        tracing::warn!("Invalid or tampered OAuth state parameter");
        return Ok(failure_redirect());
    }

    let Some(code) = params.code else {
        tracing::warn!("OAuth callback missing authorization code");
        return Ok(failure_redirect());
    };

    let callback_url = callback_url_from_headers(&headers, state.config.port);

    let profile = match state.google.exchange_code(&code, &callback_url).await {
        Ok(profile) => profile,
        Err(AppError::ExchangeFailed(msg)) => {
            tracing::warn!(error = %msg, "Authorization code exchange failed");
            return Ok(failure_redirect());
        }
        Err(err) => return Err(err),
    };

    // Store failures from here on are 500s, not login-failure redirects.
    let user = state.identity.reconcile(&profile).await?;
    let token = state.sessions.establish(user.id).await?;

    tracing::info!(user_id = user.id, "OAuth successful, session established");

    let jar = jar.add(session_cookie(token, state.config.cookie_secure));
    Ok((
        jar,
        Json(AuthSuccess {
            success: true,
            message: "Authentication successful".to_string(),
            user,
        }),
    )
        .into_response())
}

/// Callback success body: the reconciled record lives under `user`,
/// not the generic envelope's `data`.
#[derive(Serialize)]
struct AuthSuccess {
    success: bool,
    message: String,
    user: User,
}

#[derive(Serialize)]
struct FailureResponse {
    success: bool,
    message: String,
}

/// Login failure endpoint - 401, never creates a session.
async fn auth_failure() -> impl IntoResponse {
    (
        axum::http::StatusCode::UNAUTHORIZED,
        Json(FailureResponse {
            success: false,
            message: "Google authentication failed".to_string(),
        }),
    )
}

/// Logout - destroy the session and clear the cookie. Idempotent.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Result<Response> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value()).await?;
    }

    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    Ok((jar, Json(ApiResponse::message("Logged out successfully"))).into_response())
}

fn failure_redirect() -> Response {
    Redirect::temporary("/auth/google/failure").into_response()
}

/// Build the session cookie handed to the browser.
fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(SESSION_COOKIE_MAX_AGE_HOURS))
        .build()
}

/// Derive the OAuth callback URL from the request's Host header.
fn callback_url_from_headers(headers: &HeaderMap, port: u16) -> String {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("localhost:{}", port));

    let scheme = if host.contains("localhost") || host.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };

    format!("{}://{}/auth/google/callback", scheme, host)
}

/// Build an HMAC-signed state parameter: base64url("nonce|timestamp|sig").
fn build_signed_state(secret: &[u8]) -> Result<String> {
    let nonce = hex::encode(rand::rng().random::<[u8; 16]>());
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    let payload = format!("{}|{:x}", nonce, timestamp);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify the HMAC signature on an OAuth state parameter.
fn verify_state(state: &str, secret: &[u8]) -> bool {
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(state) else {
        return false;
    };
    let Ok(state_str) = String::from_utf8(bytes) else {
        return false;
    };

    // Format is "nonce|timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    if parts.len() != 3 {
        return false;
    }

    let payload = format!("{}|{}", parts[0], parts[1]);

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    if parts[2] != expected {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return false;
    }

    true
}
