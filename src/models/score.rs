// SPDX-License-Identifier: MIT

//! Score model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single score entry owned by a user. Scores are deleted together
/// with their owning user in one transaction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Score {
    pub id: i64,
    pub user_id: i64,
    pub score: i64,
    pub created_at: String,
}
