// SPDX-License-Identifier: MIT

//! Teamscore API Server
//!
//! Team leaderboard backend: Google OAuth login, server-side sessions,
//! and CRUD for teams, users and scores.

use std::sync::Arc;
use teamscore::{
    config::Config,
    db::{self, Store},
    services::{GoogleClient, IdentityService, SessionManager},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // A missing session secret or OAuth credential aborts startup here.
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Teamscore API");

    let pool = db::init(&config.database_url)
        .await
        .expect("Failed to initialize database");

    let store = Store::new(pool.clone());
    let sessions = SessionManager::new(pool.clone());
    let identity = IdentityService::new(store.clone());
    let google = GoogleClient::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        sessions: sessions.clone(),
        identity,
        google,
    });

    let app = teamscore::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Best-effort cleanup before the pool goes away.
    if let Ok(swept) = sessions.destroy_expired().await {
        tracing::info!(swept, "Swept expired sessions");
    }
    pool.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("teamscore=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
