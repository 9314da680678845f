use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpMessage, HttpRequest};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::domain::Role;
use crate::error::{AppError, AppResult};
use crate::utils::jwt::validate_token;

/// Caller identity taken from a verified bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<AppResult<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> AppResult<AuthenticatedUser> {
    let token = bearer_token(req).ok_or(AppError::Unauthorized)?;
    let config = req.app_data::<web::Data<AuthConfig>>().ok_or_else(|| {
        AppError::InternalError(anyhow::anyhow!("missing AuthConfig app data"))
    })?;

    let claims = validate_token(token, config.get_ref())?;
    let user = AuthenticatedUser {
        user_id: claims.sub,
        role: claims.role()?,
    };

    // Picked up by the request logger once the handler has run.
    req.extensions_mut().insert(user);
    Ok(user)
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
