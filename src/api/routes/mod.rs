use std::sync::Arc;

use actix_web::web;
use sqlx::PgPool;

use crate::application::ConversationService;
use crate::config::SecurityConfig;
use crate::observability::AppMetrics;

pub mod conversations;
pub mod system;

/// Shared handles every handler reaches through `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub conversation_service: Arc<ConversationService>,
    pub security: SecurityConfig,
    pub metrics: Arc<AppMetrics>,
    pub db_pool: PgPool,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1").configure(conversations::configure))
        .configure(system::configure);
}
