use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use actix_web::dev::{Service, ServiceRequest, Transform};
use actix_web::http::Method;

use crate::identity::client_ip;
use crate::rate_limit::RateLimiter;

/// Per-IP throttle for vote submission. Wraps only the votes resource;
/// reads and comments stay unthrottled.
pub struct Throttle {
    limiter: Arc<dyn RateLimiter>,
}

impl Throttle {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S> Transform<S, ServiceRequest> for Throttle
where
    S: Service<ServiceRequest> + 'static,
    S::Future: 'static,
    S::Error: Into<actix_web::Error>,
{
    type Error = actix_web::Error;
    type Response = S::Response;
    type Transform = ThrottleService<S>;
    type InitError = ();
    type Future = Pin<Box<dyn Future<Output = Result<Self::Transform, Self::InitError>>>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let limiter = self.limiter.clone();
        Box::pin(async move {
            Ok(ThrottleService {
                limiter,
                next_service: service,
            })
        })
    }
}

pub struct ThrottleService<S> {
    limiter: Arc<dyn RateLimiter>,
    next_service: S,
}

impl<S> Service<ServiceRequest> for ThrottleService<S>
where
    S: Service<ServiceRequest>,
    S::Future: 'static,
    S::Error: Into<actix_web::Error>,
{
    type Response = S::Response;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, ctx: &mut core::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.next_service.poll_ready(ctx).map_err(|e| e.into())
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.method() == Method::POST {
            let ip = client_ip(req.headers());
            if !self.limiter.admit(&ip) {
                log::warn!("rate limited vote submission from {}", ip);
                return Box::pin(async move { Err(crate::error::Error::RateLimited.into()) });
            }
        }
        let res_fut = self.next_service.call(req);
        Box::pin(async move {
            let resp = res_fut.await.map_err(|e| e.into())?;
            Ok(resp)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::MemoryRateLimiter;
    use actix_web::http::header;
    use actix_web::{test, web, App, HttpResponse};

    #[actix_web::test]
    async fn thirty_first_vote_from_one_ip_gets_429() {
        let limiter: Arc<dyn RateLimiter> = Arc::new(MemoryRateLimiter::new());
        let app = test::init_service(
            App::new().service(
                web::resource("/api/votes")
                    .wrap(Throttle::new(limiter))
                    .route(web::post().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;

        for _ in 0..30 {
            let req = test::TestRequest::post()
                .uri("/api/votes")
                .insert_header(("x-forwarded-for", "203.0.113.9"))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert!(resp.status().is_success());
        }
        let req = test::TestRequest::post()
            .uri("/api/votes")
            .insert_header(("x-forwarded-for", "203.0.113.9"))
            .to_request();
        let resp = test::try_call_service(&app, req).await.unwrap_err();
        let resp = resp.error_response();
        assert_eq!(resp.status().as_u16(), 429);
        assert_eq!(resp.headers().get(header::RETRY_AFTER).unwrap(), "60");
    }

    #[actix_web::test]
    async fn other_ips_are_unaffected() {
        let limiter: Arc<dyn RateLimiter> = Arc::new(MemoryRateLimiter::new());
        let app = test::init_service(
            App::new().service(
                web::resource("/api/votes")
                    .wrap(Throttle::new(limiter))
                    .route(web::post().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;

        for _ in 0..31 {
            let req = test::TestRequest::post()
                .uri("/api/votes")
                .insert_header(("x-forwarded-for", "203.0.113.9"))
                .to_request();
            let _ = test::try_call_service(&app, req).await;
        }
        let req = test::TestRequest::post()
            .uri("/api/votes")
            .insert_header(("x-forwarded-for", "198.51.100.4"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
