// SPDX-License-Identifier: MIT

//! Relational store with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage, reconciliation lookups)
//! - Teams
//! - Scores
//!
//! All session state is handled by [`crate::services::SessionManager`].

use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{Score, Team, User};

/// Store handle, cheap to clone (wraps the connection pool).
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
}

impl Store {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Look up a user by external provider id.
    pub async fn find_user_by_google_id(&self, google_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE google_id = ?")
            .bind(google_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Insert a user created from a verified OAuth profile.
    ///
    /// A concurrent first login for the same provider id loses the race at
    /// the unique index and surfaces `AppError::DuplicateIdentity`.
    pub async fn create_google_user(
        &self,
        google_id: &str,
        name: &str,
        email: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<User> {
        let user = sqlx::query_as(
            "INSERT INTO users (google_id, name, email, avatar_url) \
             VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(google_id)
        .bind(name)
        .bind(email)
        .bind(avatar_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::DuplicateIdentity
            }
            _ => AppError::Database(err.to_string()),
        })?;
        Ok(user)
    }

    /// Insert a user created through the admin API (no provider identity).
    pub async fn create_user(&self, name: &str, team_id: i64) -> Result<User> {
        let user =
            sqlx::query_as("INSERT INTO users (name, team_id) VALUES (?, ?) RETURNING *")
                .bind(name)
                .bind(team_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn list_users_by_team(&self, team_id: i64) -> Result<Vec<User>> {
        let users = sqlx::query_as("SELECT * FROM users WHERE team_id = ? ORDER BY id")
            .bind(team_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Update name and/or team assignment. Returns None if the user
    /// does not exist.
    pub async fn update_user(
        &self,
        id: i64,
        name: Option<&str>,
        team_id: Option<i64>,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as(
            "UPDATE users SET name = COALESCE(?, name), \
             team_id = COALESCE(?, team_id) WHERE id = ? RETURNING *",
        )
        .bind(name)
        .bind(team_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Delete a user together with their scores and sessions in one
    /// transaction.
    ///
    /// Either the user row and every dependent row are gone, or none
    /// are. Returns false if the user did not exist.
    pub async fn delete_user_with_scores(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM scores WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(deleted.rows_affected() > 0)
    }

    // ─── Team Operations ─────────────────────────────────────────

    pub async fn list_teams(&self) -> Result<Vec<Team>> {
        let teams = sqlx::query_as("SELECT * FROM teams ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(teams)
    }

    pub async fn find_team_by_id(&self, id: i64) -> Result<Option<Team>> {
        let team = sqlx::query_as("SELECT * FROM teams WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(team)
    }

    pub async fn create_team(&self, name: &str) -> Result<Team> {
        let team = sqlx::query_as("INSERT INTO teams (name) VALUES (?) RETURNING *")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(team)
    }

    pub async fn update_team(&self, id: i64, name: &str) -> Result<Option<Team>> {
        let team = sqlx::query_as("UPDATE teams SET name = ? WHERE id = ? RETURNING *")
            .bind(name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(team)
    }

    pub async fn delete_team(&self, id: i64) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(deleted.rows_affected() > 0)
    }

    // ─── Score Operations ────────────────────────────────────────

    pub async fn list_scores(&self) -> Result<Vec<Score>> {
        let scores = sqlx::query_as("SELECT * FROM scores ORDER BY score DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(scores)
    }

    pub async fn list_scores_for_user(&self, user_id: i64) -> Result<Vec<Score>> {
        let scores = sqlx::query_as("SELECT * FROM scores WHERE user_id = ? ORDER BY id DESC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(scores)
    }

    pub async fn find_score_by_id(&self, id: i64) -> Result<Option<Score>> {
        let score = sqlx::query_as("SELECT * FROM scores WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(score)
    }

    pub async fn create_score(&self, user_id: i64, score: i64) -> Result<Score> {
        let row = sqlx::query_as("INSERT INTO scores (user_id, score) VALUES (?, ?) RETURNING *")
            .bind(user_id)
            .bind(score)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn update_score(&self, id: i64, score: i64) -> Result<Option<Score>> {
        let row = sqlx::query_as("UPDATE scores SET score = ? WHERE id = ? RETURNING *")
            .bind(score)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn delete_score(&self, id: i64) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM scores WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(deleted.rows_affected() > 0)
    }
}
