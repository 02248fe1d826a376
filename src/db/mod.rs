// SPDX-License-Identifier: MIT

//! Database pool initialization and migrations.

mod store;

pub use store::Store;

use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub type DbPool = SqlitePool;

/// Execute a SQL migration file, properly handling comments.
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    for statement in sql.split(';') {
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

/// Open the connection pool and apply migrations.
///
/// An in-memory URL gets a single connection so every handle sees the
/// same database (used by tests).
pub async fn init(database_url: &str) -> Result<DbPool> {
    let max_connections = if database_url.contains(":memory:") {
        1
    } else {
        5
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    // Enable WAL mode for better concurrency
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    execute_sql(&pool, include_str!("../../migrations/001_initial.sql")).await?;

    tracing::info!(url = database_url, "Database initialized");
    Ok(pool)
}
