use chrono::{Duration, Utc};
use sqlx::{query, query_as, query_scalar, PgPool};
use uuid::Uuid;

use crate::error::Error;
use crate::models::{Category, Poll};
use crate::password::{hash_password, random_salt};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

const POLL_LIFETIME_HOURS: i64 = 24;

/// Creates a new poll and makes it the single active one. Any currently
/// active poll is archived first.
pub async fn create_poll(
    pool: &PgPool,
    question: String,
    category: Option<&str>,
    custom_category: Option<String>,
) -> Result<Poll, Error> {
    let category = Category::parse(category);
    let custom_category = if category == Category::Custom {
        custom_category
    } else {
        None
    };
    let now = Utc::now();
    let mut tx = pool.begin().await?;
    query("UPDATE polls SET is_active = FALSE WHERE is_active = TRUE")
        .execute(&mut tx)
        .await?;
    let poll: Poll = query_as(
        r#"INSERT INTO polls (id, question, category, custom_category, created_at, expires_at, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, TRUE)
        RETURNING *"#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(question)
    .bind(category.as_str())
    .bind(custom_category)
    .bind(now)
    .bind(now + Duration::hours(POLL_LIFETIME_HOURS))
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(poll)
}

pub async fn get_poll(pool: &PgPool, id: &str) -> Result<Option<Poll>, Error> {
    let poll = query_as("SELECT * FROM polls WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(poll)
}

pub async fn active_poll(pool: &PgPool) -> Result<Option<Poll>, Error> {
    let poll = query_as("SELECT * FROM polls WHERE is_active = TRUE LIMIT 1")
        .fetch_optional(pool)
        .await?;
    Ok(poll)
}

/// Archived polls, newest first.
pub async fn archived_polls(pool: &PgPool) -> Result<Vec<Poll>, Error> {
    let polls = query_as("SELECT * FROM polls WHERE is_active = FALSE ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    Ok(polls)
}

/// Partial update from the admin dashboard. Activating a poll deactivates
/// every other poll first, keeping the single-active invariant.
pub async fn update_poll(
    pool: &PgPool,
    id: &str,
    question: Option<String>,
    is_active: Option<bool>,
) -> Result<Poll, Error> {
    let mut tx = pool.begin().await?;
    let existing: Option<Poll> = query_as("SELECT * FROM polls WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut tx)
        .await?;
    if existing.is_none() {
        return Err(Error::NotFound("Poll not found".into()));
    }
    if is_active == Some(true) {
        query("UPDATE polls SET is_active = FALSE WHERE id <> $1")
            .bind(id)
            .execute(&mut tx)
            .await?;
    }
    let poll: Poll = query_as(
        r#"UPDATE polls
        SET question = COALESCE($2, question), is_active = COALESCE($3, is_active)
        WHERE id = $1
        RETURNING *"#,
    )
    .bind(id)
    .bind(question)
    .bind(is_active)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(poll)
}

/// Deletes a poll together with its votes and comments in one transaction,
/// so a crash mid-sequence cannot leave orphaned rows.
pub async fn delete_poll(pool: &PgPool, id: &str) -> Result<(), Error> {
    let mut tx = pool.begin().await?;
    let exists: bool = query_scalar("SELECT EXISTS(SELECT 1 FROM polls WHERE id = $1)")
        .bind(id)
        .fetch_one(&mut tx)
        .await?;
    if !exists {
        return Err(Error::NotFound("Poll not found".into()));
    }
    query("DELETE FROM comments WHERE poll_id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    query("DELETE FROM votes WHERE poll_id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    query("DELETE FROM polls WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Archives every active poll whose expiry has passed. Idempotent, runs
/// from the cron endpoint.
pub async fn sweep_expired(pool: &PgPool) -> Result<u64, Error> {
    let archived: Vec<(String,)> = query_as(
        "UPDATE polls SET is_active = FALSE WHERE is_active = TRUE AND expires_at < now() RETURNING id",
    )
    .fetch_all(pool)
    .await?;
    for (id,) in &archived {
        log::info!("archived expired poll: {}", id);
    }
    Ok(archived.len() as u64)
}

/// Inserts the default admin account on first boot. Idempotent. The
/// password is stored as a salted hash, never in the clear.
pub async fn ensure_default_admin(pool: &PgPool) -> Result<(), Error> {
    let count: i64 = query_scalar("SELECT COUNT(*) FROM admins")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }
    let salt = random_salt();
    query("INSERT INTO admins (id, username, password_hash, salt) VALUES ($1, $2, $3, $4)")
        .bind(Uuid::new_v4().to_string())
        .bind(DEFAULT_ADMIN_USERNAME)
        .bind(hash_password(DEFAULT_ADMIN_PASSWORD, &salt))
        .bind(salt)
        .execute(pool)
        .await?;
    log::info!("created default admin user");
    Ok(())
}
