// SPDX-License-Identifier: MIT

//! User and session models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record.
///
/// `google_id` is the external provider identifier; it is unique when
/// present and acts as the idempotency key for OAuth reconciliation.
/// It is null for users created directly through the admin API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub google_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub team_id: Option<i64>,
    pub created_at: String,
}

/// Server-side session row. The cookie carries only the opaque token;
/// `token_hash` is its SHA-256 digest.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    pub token_hash: String,
    pub created_at: String,
    pub expires_at: String,
}
