// SPDX-License-Identifier: MIT

use std::sync::Arc;
use teamscore::config::Config;
use teamscore::db::{self, DbPool, Store};
use teamscore::routes::create_router;
use teamscore::services::{GoogleClient, GoogleProfile, IdentityService, SessionManager};
use teamscore::AppState;

/// Create a fresh in-memory database with migrations applied.
#[allow(dead_code)]
pub async fn test_pool() -> DbPool {
    db::init("sqlite::memory:")
        .await
        .expect("Failed to initialize in-memory database")
}

/// Create a test app backed by an in-memory database.
/// Returns the router, the shared state, and the raw pool.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>, DbPool) {
    let config = Config::test_default();
    let google = GoogleClient::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    );
    create_test_app_with_google(google).await
}

/// Create a test app with a custom Google client (e.g. stub endpoints).
#[allow(dead_code)]
pub async fn create_test_app_with_google(
    google: GoogleClient,
) -> (axum::Router, Arc<AppState>, DbPool) {
    let config = Config::test_default();
    let pool = test_pool().await;
    let store = Store::new(pool.clone());

    let state = Arc::new(AppState {
        config,
        store: store.clone(),
        sessions: SessionManager::new(pool.clone()),
        identity: IdentityService::new(store),
        google,
    });

    (create_router(state.clone()), state, pool)
}

/// Build a verified profile as the OAuth adapter would produce it.
#[allow(dead_code)]
pub fn profile(provider_id: &str, display_name: &str, emails: &[&str]) -> GoogleProfile {
    GoogleProfile {
        provider_id: provider_id.to_string(),
        display_name: display_name.to_string(),
        emails: emails.iter().map(|e| e.to_string()).collect(),
        avatar_url: None,
    }
}

/// Log a user in through reconciliation and return the session cookie
/// header value along with the user id.
#[allow(dead_code)]
pub async fn login(state: &Arc<AppState>, provider_id: &str) -> (String, i64) {
    let user = state
        .identity
        .reconcile(&profile(provider_id, "Test User", &["test@example.com"]))
        .await
        .expect("reconcile failed");

    let token = state
        .sessions
        .establish(user.id)
        .await
        .expect("establish failed");

    (format!("teamscore_session={}", token), user.id)
}
