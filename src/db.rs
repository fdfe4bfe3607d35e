//! Database connection and schema bootstrap.
//!
//! The schema statements are idempotent so they can run unconditionally at
//! startup, both for the server binary and for integration tests pointed at a
//! scratch database.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        age INTEGER NOT NULL DEFAULT 0 CHECK (age >= 0),
        avatar BYTEA,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS user_tokens (
        user_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        token TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (user_id, token)
    )",
    "CREATE TABLE IF NOT EXISTS tasks (
        id UUID PRIMARY KEY,
        description TEXT NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        owner_id UUID NOT NULL REFERENCES users (id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS idx_tasks_owner ON tasks (owner_id)",
];

/// Opens a connection pool against the given Postgres URL.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect(database_url)
        .await
}

/// Creates the tables the application needs if they do not exist yet.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    log::debug!("database schema is up to date");
    Ok(())
}
