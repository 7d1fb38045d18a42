use actix_web::web::Data;
use actix_web::HttpResponse;
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

use crate::error::Error;
use crate::{polls, schema};

/// GET /api/cron - archive expired polls. Intended for the external
/// scheduler; idempotent, so a manual call is harmless.
pub async fn cron(db: Data<PgPool>) -> Result<HttpResponse, Error> {
    let archived = polls::sweep_expired(&db).await?;
    log::info!("expiry sweep archived {} poll(s)", archived);
    Ok(HttpResponse::Ok().json(json!({ "message": "Checked and archived expired polls" })))
}

/// GET /api/init - bootstrap: ensure schema, default admin, and run one
/// expiry sweep. Idempotent.
pub async fn init(db: Data<PgPool>) -> Result<HttpResponse, Error> {
    schema::init(&db).await?;
    polls::ensure_default_admin(&db).await?;
    polls::sweep_expired(&db).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Initialization completed successfully",
        "timestamp": Utc::now().to_rfc3339(),
    })))
}
