use sqlx::{query, query_as, PgPool};
use uuid::Uuid;

use crate::error::Error;
use crate::identity::Identity;
use crate::models::{Comment, Vote};

pub const MAX_COMMENT_LENGTH: usize = 280;
const RECENT_COMMENTS_LIMIT: i64 = 50;

/// Records a vote for the active poll. An identity (IP address or device
/// fingerprint) holds at most one vote per poll; resubmission is rejected,
/// never merged.
pub async fn submit_vote(
    pool: &PgPool,
    poll_id: &str,
    answer: bool,
    identity: &Identity,
) -> Result<String, Error> {
    let poll = crate::polls::get_poll(pool, poll_id).await?;
    let poll = poll.ok_or_else(|| Error::NotFound("Poll not found".into()))?;
    if !poll.is_active {
        return Err(Error::Validation("This poll has expired".into()));
    }

    let by_ip: Option<Vote> = query_as("SELECT * FROM votes WHERE poll_id = $1 AND ip_address = $2")
        .bind(poll_id)
        .bind(&identity.ip_address)
        .fetch_optional(pool)
        .await?;
    if by_ip.is_some() {
        return Err(Error::Conflict("You have already voted on this poll".into()));
    }
    let by_device: Option<Vote> =
        query_as("SELECT * FROM votes WHERE poll_id = $1 AND device_fingerprint = $2")
            .bind(poll_id)
            .bind(&identity.device_fingerprint)
            .fetch_optional(pool)
            .await?;
    if by_device.is_some() {
        return Err(Error::Conflict(
            "You have already voted on this poll from this device".into(),
        ));
    }

    let vote_id = Uuid::new_v4().to_string();
    query(
        "INSERT INTO votes (id, poll_id, ip_address, device_fingerprint, answer) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&vote_id)
    .bind(poll_id)
    .bind(&identity.ip_address)
    .bind(&identity.device_fingerprint)
    .bind(answer)
    .execute(pool)
    .await?;
    Ok(vote_id)
}

/// Whether this identity has already voted on the poll and, if so, how.
pub async fn check_status(
    pool: &PgPool,
    poll_id: &str,
    identity: &Identity,
) -> Result<Option<bool>, Error> {
    let existing: Option<Vote> = query_as(
        "SELECT * FROM votes WHERE poll_id = $1 AND (ip_address = $2 OR device_fingerprint = $3) LIMIT 1",
    )
    .bind(poll_id)
    .bind(&identity.ip_address)
    .bind(&identity.device_fingerprint)
    .fetch_optional(pool)
    .await?;
    Ok(existing.map(|v| v.answer))
}

/// Records a comment. Comments share the vote dedup rule but form their own
/// uniqueness space, so commenting does not consume the vote slot.
pub async fn submit_comment(
    pool: &PgPool,
    poll_id: &str,
    content: String,
    answer: bool,
    identity: &Identity,
) -> Result<Comment, Error> {
    if content.chars().count() > MAX_COMMENT_LENGTH {
        return Err(Error::Validation(
            "Comment is too long (max 280 characters)".into(),
        ));
    }
    let poll = crate::polls::get_poll(pool, poll_id).await?;
    if poll.is_none() {
        return Err(Error::NotFound("Poll not found".into()));
    }

    let by_ip: Option<Comment> =
        query_as("SELECT * FROM comments WHERE poll_id = $1 AND ip_address = $2")
            .bind(poll_id)
            .bind(&identity.ip_address)
            .fetch_optional(pool)
            .await?;
    if by_ip.is_some() {
        return Err(Error::Conflict(
            "You have already submitted a comment for this poll".into(),
        ));
    }
    let by_device: Option<Comment> =
        query_as("SELECT * FROM comments WHERE poll_id = $1 AND device_fingerprint = $2")
            .bind(poll_id)
            .bind(&identity.device_fingerprint)
            .fetch_optional(pool)
            .await?;
    if by_device.is_some() {
        return Err(Error::Conflict(
            "You have already submitted a comment for this poll from this device".into(),
        ));
    }

    let comment: Comment = query_as(
        r#"INSERT INTO comments (id, poll_id, content, answer, ip_address, device_fingerprint)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *"#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(poll_id)
    .bind(content)
    .bind(answer)
    .bind(&identity.ip_address)
    .bind(&identity.device_fingerprint)
    .fetch_one(pool)
    .await?;
    Ok(comment)
}

/// Most recent comments for a poll, newest first.
pub async fn recent_comments(pool: &PgPool, poll_id: &str) -> Result<Vec<Comment>, Error> {
    let comments = query_as(
        "SELECT * FROM comments WHERE poll_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(poll_id)
    .bind(RECENT_COMMENTS_LIMIT)
    .fetch_all(pool)
    .await?;
    Ok(comments)
}
