use actix_web::web::{Data, Json, Path};
use actix_web::HttpResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{query_as, FromRow, PgPool};

use crate::error::Error;
use crate::models::Admin;
use crate::password::verify_password;
use crate::polls;

#[derive(Debug, Deserialize)]
pub struct Login {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /api/admin/auth - verify admin credentials against the stored
/// salted hash. Same response for unknown user and wrong password.
pub async fn login(body: Json<Login>, db: Data<PgPool>) -> Result<HttpResponse, Error> {
    let body = body.into_inner();
    let (username, password) = match (body.username, body.password) {
        (Some(u), Some(p)) => (u, p),
        _ => {
            return Err(Error::Validation(
                "Username and password are required".into(),
            ))
        }
    };
    let admin: Option<Admin> = query_as("SELECT * FROM admins WHERE username = $1")
        .bind(&username)
        .fetch_optional(&**db)
        .await?;
    let admin = match admin {
        Some(a) if verify_password(&password, &a.salt, &a.password_hash) => a,
        _ => return Err(Error::Unauthorized("Invalid credentials".into())),
    };
    Ok(HttpResponse::Ok().json(json!({
        "message": "Login successful",
        "admin": { "id": admin.id, "username": admin.username },
    })))
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PollWithCount {
    pub id: String,
    pub question: String,
    pub category: String,
    pub custom_category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub vote_count: i64,
}

/// GET /api/admin/polls - every poll with its vote count, newest first.
pub async fn list(db: Data<PgPool>) -> Result<Json<Vec<PollWithCount>>, Error> {
    let polls: Vec<PollWithCount> = query_as(
        r#"SELECT p.*, COUNT(v.id) AS vote_count
        FROM polls AS p
        LEFT JOIN votes AS v ON p.id = v.poll_id
        GROUP BY p.id
        ORDER BY p.created_at DESC"#,
    )
    .fetch_all(&**db)
    .await?;
    Ok(Json(polls))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creation {
    pub question: Option<String>,
    pub category: Option<String>,
    pub custom_category: Option<String>,
}

/// POST /api/admin/polls - create a poll, archiving the current active one.
pub async fn create(body: Json<Creation>, db: Data<PgPool>) -> Result<HttpResponse, Error> {
    let body = body.into_inner();
    let question = body
        .question
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| Error::Validation("Question is required".into()))?;
    let poll = polls::create_poll(&db, question, body.category.as_deref(), body.custom_category).await?;
    Ok(HttpResponse::Created().json(poll))
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VoteSummary {
    pub id: String,
    pub answer: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollDetail {
    #[serde(flatten)]
    pub poll: crate::models::Poll,
    pub votes: Vec<VoteSummary>,
}

/// GET /api/admin/polls/{id} - one poll with its individual votes.
pub async fn detail(poll_id: Path<(String,)>, db: Data<PgPool>) -> Result<Json<PollDetail>, Error> {
    let poll_id = poll_id.into_inner().0;
    let poll = polls::get_poll(&db, &poll_id)
        .await?
        .ok_or_else(|| Error::NotFound("Poll not found".into()))?;
    let votes: Vec<VoteSummary> = query_as(
        "SELECT id, answer, created_at FROM votes WHERE poll_id = $1 ORDER BY created_at DESC",
    )
    .bind(&poll_id)
    .fetch_all(&**db)
    .await?;
    Ok(Json(PollDetail { poll, votes }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Updation {
    pub question: Option<String>,
    pub is_active: Option<bool>,
}

/// PATCH /api/admin/polls/{id} - edit the question or flip the active flag.
pub async fn update(
    poll_id: Path<(String,)>,
    body: Json<Updation>,
    db: Data<PgPool>,
) -> Result<Json<crate::models::Poll>, Error> {
    let poll_id = poll_id.into_inner().0;
    let body = body.into_inner();
    let poll = polls::update_poll(&db, &poll_id, body.question, body.is_active).await?;
    Ok(Json(poll))
}

/// DELETE /api/admin/polls/{id} - cascading delete of the poll and its
/// votes and comments.
pub async fn delete(poll_id: Path<(String,)>, db: Data<PgPool>) -> Result<HttpResponse, Error> {
    let poll_id = poll_id.into_inner().0;
    polls::delete_poll(&db, &poll_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Poll deleted successfully" })))
}
