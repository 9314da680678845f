use std::time::Instant;

use actix_web::http::header;
use actix_web::{HttpMessage, HttpRequest};
use tracing::{info, Span};
use uuid::Uuid;

use super::auth::AuthenticatedUser;

/// What the access log needs about one request, captured before the handler
/// consumes it.
pub struct RequestContext {
    pub request_id: String,
    pub method: String,
    pub path: String,
    client_ip: String,
    user_agent: String,
    started: Instant,
}

impl RequestContext {
    pub fn capture(req: &HttpRequest) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            method: req.method().to_string(),
            path: req.path().to_string(),
            // Forwarding headers only count when the server is configured to trust them.
            client_ip: req
                .connection_info()
                .realip_remote_addr()
                .unwrap_or("unknown")
                .to_string(),
            user_agent: req
                .headers()
                .get(header::USER_AGENT)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("unknown")
                .to_string(),
            started: Instant::now(),
        }
    }

    pub fn span(&self) -> Span {
        tracing::info_span!(
            "request",
            request_id = %self.request_id,
            method = %self.method,
            path = %self.path,
        )
    }

    /// Logs the completed request and returns its latency in milliseconds.
    pub fn finish(&self, req: &HttpRequest, status: u16) -> u64 {
        let latency_ms = self.started.elapsed().as_millis() as u64;
        info!(
            user_id = %caller_id(req),
            client_ip = %self.client_ip,
            user_agent = %self.user_agent,
            status = status,
            status_class = status_class(status),
            latency_ms = latency_ms,
            "request completed"
        );
        latency_ms
    }
}

/// Authenticated caller recorded by the extractor, or "anonymous".
pub fn caller_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<AuthenticatedUser>()
        .map(|user| user.user_id.to_string())
        .unwrap_or_else(|| "anonymous".to_string())
}

pub fn status_class(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "unknown",
    }
}
