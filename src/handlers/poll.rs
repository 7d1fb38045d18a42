use actix_web::web::{Data, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::Error;
use crate::polls;
use crate::stats::{self, Statistics};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollWithStats {
    pub id: String,
    pub question: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub statistics: Statistics,
}

/// GET /api/polls - the current active poll with its vote statistics.
pub async fn active(db: Data<PgPool>) -> Result<Json<PollWithStats>, Error> {
    let poll = polls::active_poll(&db)
        .await?
        .ok_or_else(|| Error::NotFound("No active poll found".into()))?;
    let statistics = stats::for_poll(&db, &poll.id).await?;
    Ok(Json(PollWithStats {
        id: poll.id,
        question: poll.question,
        created_at: poll.created_at,
        expires_at: poll.expires_at,
        statistics,
    }))
}

/// GET /api/polls/history - archived polls, newest first. Statistics for
/// the whole set come from one grouped query rather than a lookup per poll.
pub async fn history(db: Data<PgPool>) -> Result<Json<Vec<PollWithStats>>, Error> {
    let archived = polls::archived_polls(&db).await?;
    let ids: Vec<String> = archived.iter().map(|p| p.id.clone()).collect();
    let mut per_poll = stats::for_polls(&db, &ids).await?;
    let entries = archived
        .into_iter()
        .map(|poll| {
            let statistics = per_poll.remove(&poll.id).unwrap_or_else(Statistics::empty);
            PollWithStats {
                id: poll.id,
                question: poll.question,
                created_at: poll.created_at,
                expires_at: poll.expires_at,
                statistics,
            }
        })
        .collect();
    Ok(Json(entries))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedPoll {
    pub id: String,
    pub question: String,
    pub category: String,
    pub custom_category: Option<String>,
    pub statistics: Statistics,
}

/// GET /api/embed - minimal active-poll payload for the iframe widget.
pub async fn embed(db: Data<PgPool>) -> Result<Json<EmbedPoll>, Error> {
    let poll = polls::active_poll(&db)
        .await?
        .ok_or_else(|| Error::NotFound("No active poll found".into()))?;
    let statistics = stats::for_poll(&db, &poll.id).await?;
    Ok(Json(EmbedPoll {
        id: poll.id,
        question: poll.question,
        category: poll.category,
        custom_category: poll.custom_category,
        statistics,
    }))
}
