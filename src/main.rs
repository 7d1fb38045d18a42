mod ballots;
mod error;
mod handlers;
mod identity;
mod middlewares;
mod models;
mod password;
mod polls;
mod rate_limit;
mod schema;
mod stats;

use std::sync::Arc;

use actix_web::web::{delete, get, patch, post, resource, scope, Data};
use actix_web::HttpServer;
use sqlx::postgres::PgPoolOptions;

use middlewares::throttle::Throttle;
use rate_limit::{MemoryRateLimiter, RateLimiter};

#[actix_web::main]
async fn main() -> Result<(), std::io::Error> {
    dotenv::dotenv().ok();
    env_logger::init();
    let database_url = dotenv::var("DATABASE_URL").expect("environment variable DATABASE_URL not been set");
    let port: u16 = dotenv::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("failed to connect to database");
    schema::init(&pool).await.expect("failed to initialize schema");
    polls::ensure_default_admin(&pool)
        .await
        .expect("failed to ensure default admin");
    polls::sweep_expired(&pool)
        .await
        .expect("failed to sweep expired polls");
    let limiter: Arc<dyn RateLimiter> = Arc::new(MemoryRateLimiter::new());
    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(Data::new(pool.clone()))
            .service(
                scope("api")
                    .service(
                        scope("polls")
                            .route("", get().to(handlers::poll::active))
                            .route("history", get().to(handlers::poll::history)),
                    )
                    .service(
                        scope("votes")
                            .service(
                                resource("")
                                    .wrap(Throttle::new(limiter.clone()))
                                    .route(post().to(handlers::vote::create)),
                            )
                            .route("check", get().to(handlers::vote::check)),
                    )
                    .service(
                        scope("comments")
                            .route("", get().to(handlers::comment::list))
                            .route("", post().to(handlers::comment::create)),
                    )
                    .route("embed", get().to(handlers::poll::embed))
                    .route("cron", get().to(handlers::maintenance::cron))
                    .route("init", get().to(handlers::maintenance::init))
                    .service(
                        scope("admin")
                            .route("auth", post().to(handlers::admin::login))
                            .service(
                                scope("polls")
                                    .route("", get().to(handlers::admin::list))
                                    .route("", post().to(handlers::admin::create))
                                    .service(
                                        scope("{poll_id}")
                                            .route("", get().to(handlers::admin::detail))
                                            .route("", patch().to(handlers::admin::update))
                                            .route("", delete().to(handlers::admin::delete)),
                                    ),
                            ),
                    ),
            )
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
