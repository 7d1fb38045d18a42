use sqlx::{query, PgPool};

use crate::error::Error;

/// Creates the tables on first boot. Safe to re-run, `GET /api/init` calls
/// it on every invocation.
pub async fn init(pool: &PgPool) -> Result<(), Error> {
    query(
        r#"CREATE TABLE IF NOT EXISTS polls (
            id TEXT PRIMARY KEY,
            question TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'general',
            custom_category TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            expires_at TIMESTAMPTZ NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT FALSE
        )"#,
    )
    .execute(pool)
    .await?;
    query(
        r#"CREATE TABLE IF NOT EXISTS votes (
            id TEXT PRIMARY KEY,
            poll_id TEXT NOT NULL REFERENCES polls(id) ON DELETE CASCADE,
            ip_address TEXT NOT NULL,
            device_fingerprint TEXT NOT NULL DEFAULT '',
            answer BOOLEAN NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
    )
    .execute(pool)
    .await?;
    query(
        r#"CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            poll_id TEXT NOT NULL REFERENCES polls(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            answer BOOLEAN NOT NULL,
            ip_address TEXT NOT NULL,
            device_fingerprint TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )"#,
    )
    .execute(pool)
    .await?;
    query(
        r#"CREATE TABLE IF NOT EXISTS admins (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            salt TEXT NOT NULL
        )"#,
    )
    .execute(pool)
    .await?;
    query("CREATE INDEX IF NOT EXISTS votes_poll_id_idx ON votes (poll_id)")
        .execute(pool)
        .await?;
    query("CREATE INDEX IF NOT EXISTS comments_poll_id_idx ON comments (poll_id)")
        .execute(pool)
        .await?;
    Ok(())
}
