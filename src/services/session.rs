// SPDX-License-Identifier: MIT

//! Server-side session management.
//!
//! The client holds only an opaque random token; the token's SHA-256
//! hash resolves to a user id through the `sessions` table. Expiry is
//! checked on access rather than actively swept.

use crate::db::DbPool;
use crate::error::Result;
use crate::models::Session;
use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Session lifetime (absolute, from establishment).
const SESSION_TTL_HOURS: i64 = 24;

#[derive(Clone)]
pub struct SessionManager {
    pool: DbPool,
}

/// Generate a random session token.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Hash a token for storage.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

impl SessionManager {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a session bound to `user_id` and return the opaque token
    /// handed to the transport layer as a cookie.
    pub async fn establish(&self, user_id: i64) -> Result<String> {
        let token = generate_token();
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(SESSION_TTL_HOURS);
        let session_id = hex::encode(rand::rng().random::<[u8; 16]>());

        sqlx::query(
            "INSERT INTO sessions (id, user_id, token_hash, created_at, expires_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(user_id)
        .bind(hash_token(&token))
        .bind(now.to_rfc3339())
        .bind(expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(token)
    }

    /// Resolve a token to its bound user id.
    ///
    /// Absence is a normal outcome: unknown, malformed and expired tokens
    /// all yield `None` without error.
    pub async fn resolve(&self, token: &str) -> Result<Option<i64>> {
        let session: Option<Session> =
            sqlx::query_as("SELECT * FROM sessions WHERE token_hash = ?")
                .bind(hash_token(token))
                .fetch_optional(&self.pool)
                .await?;

        let Some(session) = session else {
            return Ok(None);
        };

        let expired = DateTime::parse_from_rfc3339(&session.expires_at)
            .map(|t| t.with_timezone(&Utc) <= Utc::now())
            .unwrap_or(true);

        if expired {
            return Ok(None);
        }

        Ok(Some(session.user_id))
    }

    /// Invalidate a token. Destroying an unknown or already-destroyed
    /// token is a no-op success.
    pub async fn destroy(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(hash_token(token))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Best-effort sweep of expired rows, run on shutdown.
    pub async fn destroy_expired(&self) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(deleted.rows_affected())
    }
}
