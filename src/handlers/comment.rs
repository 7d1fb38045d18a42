use actix_web::web::{Data, Json, Query};
use actix_web::{HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::ballots;
use crate::error::Error;
use crate::handlers::AnswerValue;
use crate::identity::Identity;
use crate::models::Comment;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub poll_id: Option<String>,
    pub fingerprint: Option<String>,
    pub device_id: Option<String>,
}

/// Comment as shown to visitors: ownership flag instead of the identity
/// columns, the IP address never leaves the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub poll_id: String,
    pub content: String,
    pub answer: bool,
    pub created_at: DateTime<Utc>,
    pub is_yours: bool,
}

fn mark_ownership(comments: Vec<Comment>, identity: &Identity) -> Vec<CommentView> {
    comments
        .into_iter()
        .map(|c| CommentView {
            is_yours: c.ip_address == identity.ip_address
                || c.device_fingerprint == identity.device_fingerprint,
            id: c.id,
            poll_id: c.poll_id,
            content: c.content,
            answer: c.answer,
            created_at: c.created_at,
        })
        .collect()
}

/// GET /api/comments - up to 50 newest comments for a poll.
pub async fn list(
    req: HttpRequest,
    params: Query<ListParams>,
    db: Data<PgPool>,
) -> Result<Json<Vec<CommentView>>, Error> {
    let params = params.into_inner();
    let poll_id = params
        .poll_id
        .ok_or_else(|| Error::Validation("Poll ID is required".into()))?;
    let identity = Identity::resolve(
        req.headers(),
        params.fingerprint.as_deref(),
        params.device_id.as_deref(),
    );
    let comments = ballots::recent_comments(&db, &poll_id).await?;
    Ok(Json(mark_ownership(comments, &identity)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    pub poll_id: Option<String>,
    pub content: Option<String>,
    pub answer: Option<AnswerValue>,
    pub fingerprint: Option<String>,
    pub device_id: Option<String>,
}

/// POST /api/comments - add a comment, one per identity per poll.
pub async fn create(
    req: HttpRequest,
    body: Json<CommentPayload>,
    db: Data<PgPool>,
) -> Result<HttpResponse, Error> {
    let body = body.into_inner();
    let (poll_id, content, answer) = match (body.poll_id, body.content, body.answer) {
        (Some(poll_id), Some(content), Some(answer)) => (poll_id, content, answer),
        _ => {
            return Err(Error::Validation(
                "Poll ID, content, and answer are required".into(),
            ))
        }
    };
    let identity = Identity::resolve(
        req.headers(),
        body.fingerprint.as_deref(),
        body.device_id.as_deref(),
    );
    let comment = ballots::submit_comment(&db, &poll_id, content, answer.as_bool(), &identity).await?;
    Ok(HttpResponse::Created().json(comment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: &str, ip: &str, fingerprint: &str) -> Comment {
        Comment {
            id: id.into(),
            poll_id: "p1".into(),
            content: "agreed".into(),
            answer: true,
            ip_address: ip.into(),
            device_fingerprint: fingerprint.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn ownership_matches_on_ip_or_fingerprint() {
        let identity = Identity {
            ip_address: "203.0.113.9".into(),
            device_fingerprint: "fp-a".into(),
        };
        let views = mark_ownership(
            vec![
                comment("by-ip", "203.0.113.9", "fp-other"),
                comment("by-device", "198.51.100.4", "fp-a"),
                comment("other", "198.51.100.4", "fp-other"),
            ],
            &identity,
        );
        assert!(views[0].is_yours);
        assert!(views[1].is_yours);
        assert!(!views[2].is_yours);
    }

    #[test]
    fn view_never_carries_identity_fields() {
        let identity = Identity {
            ip_address: "203.0.113.9".into(),
            device_fingerprint: "fp-a".into(),
        };
        let views = mark_ownership(vec![comment("c1", "203.0.113.9", "fp-a")], &identity);
        let body = serde_json::to_string(&views).unwrap();
        assert!(!body.contains("203.0.113.9"));
        assert!(!body.contains("fp-a"));
        assert!(body.contains("isYours"));
    }
}
