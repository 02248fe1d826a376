// SPDX-License-Identifier: MIT

//! Teamscore: team leaderboard backend.
//!
//! REST API for teams, users and scores, with Google OAuth login and
//! server-side sessions gating all `/api/*` routes.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Store;
use services::{GoogleClient, IdentityService, SessionManager};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub sessions: SessionManager,
    pub identity: IdentityService,
    pub google: GoogleClient,
}
