use actix_web::web::{Data, Json, Query};
use actix_web::HttpRequest;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::ballots;
use crate::error::Error;
use crate::handlers::AnswerValue;
use crate::identity::Identity;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotePayload {
    pub poll_id: Option<String>,
    pub answer: Option<AnswerValue>,
    pub fingerprint: Option<String>,
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub message: String,
    pub vote_id: String,
}

/// POST /api/votes - submit a vote for the active poll.
pub async fn create(
    req: HttpRequest,
    body: Json<VotePayload>,
    db: Data<PgPool>,
) -> Result<Json<VoteResponse>, Error> {
    let body = body.into_inner();
    let (poll_id, answer) = match (body.poll_id, body.answer) {
        (Some(poll_id), Some(answer)) => (poll_id, answer),
        _ => return Err(Error::Validation("Poll ID and answer are required".into())),
    };
    let identity = Identity::resolve(
        req.headers(),
        body.fingerprint.as_deref(),
        body.device_id.as_deref(),
    );
    let vote_id = ballots::submit_vote(&db, &poll_id, answer.as_bool(), &identity).await?;
    Ok(Json(VoteResponse {
        message: "Your vote has been recorded".into(),
        vote_id,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckParams {
    pub poll_id: Option<String>,
    pub fingerprint: Option<String>,
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub has_voted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote: Option<bool>,
}

/// GET /api/votes/check - restore UI state for a returning visitor.
pub async fn check(
    req: HttpRequest,
    params: Query<CheckParams>,
    db: Data<PgPool>,
) -> Result<Json<CheckResponse>, Error> {
    let params = params.into_inner();
    let poll_id = params
        .poll_id
        .ok_or_else(|| Error::Validation("Poll ID is required".into()))?;
    let identity = Identity::resolve(
        req.headers(),
        params.fingerprint.as_deref(),
        params.device_id.as_deref(),
    );
    let vote = ballots::check_status(&db, &poll_id, &identity).await?;
    Ok(Json(CheckResponse {
        has_voted: vote.is_some(),
        vote,
    }))
}
