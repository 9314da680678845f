use std::net::IpAddr;

use actix_web::{web, HttpRequest, HttpResponse};

use super::AppState;
use crate::api::dtos::ErrorResponse;
use crate::config::SecurityConfig;
use crate::error::{AppError, AppResult};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/ready", web::get().to(ready))
        .route("/metrics", web::get().to(metrics))
        .route("/api-docs/openapi.json", web::get().to(openapi_json));
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Process is up")),
    tag = "health"
)]
pub async fn health() -> &'static str {
    "ok"
}

#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Database reachable"),
        (status = 503, description = "Database unreachable", body = ErrorResponse),
    ),
    tag = "health"
)]
pub async fn ready(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db_pool)
        .await
        .map_err(|_| AppError::ServiceUnavailable {
            service: "database".to_string(),
            message: "Service not ready".to_string(),
        })?;
    Ok(HttpResponse::Ok().body("ready"))
}

async fn metrics(state: web::Data<AppState>, request: HttpRequest) -> AppResult<HttpResponse> {
    let admin_token = request
        .headers()
        .get("x-admin-token")
        .and_then(|value| value.to_str().ok());
    let peer = request.peer_addr().map(|addr| addr.ip());

    if !metrics_allowed(&state.security, admin_token, peer) {
        return Err(AppError::Unauthorized);
    }

    let pool = &state.db_pool;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(state.metrics.render_prometheus(pool.size(), pool.num_idle())))
}

async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(crate::api::openapi::api_doc())
}

/// A matching admin token always opens the endpoint. Otherwise the peer must
/// sit on a private or loopback network unless that restriction is disabled.
fn metrics_allowed(
    security: &SecurityConfig,
    admin_token: Option<&str>,
    peer: Option<IpAddr>,
) -> bool {
    let token_matches = security
        .metrics_admin_token
        .as_deref()
        .filter(|token| !token.is_empty())
        .is_some_and(|token| admin_token == Some(token));
    if token_matches || !security.metrics_allow_private_only {
        return true;
    }
    peer.is_some_and(is_private_or_loopback)
}

fn is_private_or_loopback(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unique_local(),
    }
}
