use std::sync::Arc;

use actix_web::dev::Service as _;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use craft_market_backend::api::routes::{self, AppState};
use craft_market_backend::application::ConversationService;
use craft_market_backend::config::AppConfig;
use craft_market_backend::error::{json_error_handler, path_error_handler, query_error_handler};
use craft_market_backend::infrastructure::db::{migrations::run_migrations, pool::create_pool};
use craft_market_backend::infrastructure::repositories::{
    ConversationRepositoryImpl, MessageRepositoryImpl, OrderRepositoryImpl,
    ProductRepositoryImpl, UserRepositoryImpl,
};
use craft_market_backend::middleware::request_logging::RequestContext;
use craft_market_backend::observability::error_tracking::capture_unexpected_5xx;
use craft_market_backend::observability::AppMetrics;
use craft_market_backend::security::{cors_middleware, security_headers};
use tracing::{info, Instrument};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("failed to load application configuration")?;
    config
        .validate()
        .context("invalid application configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    if config.logging.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init();
    }

    let pool = create_pool(&config.database)
        .await
        .context("failed to create database pool")?;

    run_migrations(&pool)
        .await
        .context("database migrations failed")?;

    let conversation_service = ConversationService::new(
        Arc::new(UserRepositoryImpl::new(pool.clone())),
        Arc::new(ProductRepositoryImpl::new(pool.clone())),
        Arc::new(ConversationRepositoryImpl::new(pool.clone())),
        Arc::new(MessageRepositoryImpl::new(pool.clone())),
        Arc::new(OrderRepositoryImpl::new(pool.clone())),
        config.messaging.clone(),
    );
    let state = AppState {
        conversation_service: Arc::new(conversation_service),
        security: config.security.clone(),
        metrics: Arc::new(AppMetrics::default()),
        db_pool: pool.clone(),
    };

    let bind_host = config.host.clone();
    let bind_port = config.port;
    let security_config = config.security.clone();
    let auth_config = config.auth.clone();
    let metrics = state.metrics.clone();

    info!(
        host = %bind_host,
        port = bind_port,
        environment = %config.environment,
        "starting server"
    );

    HttpServer::new(move || {
        let metrics = metrics.clone();
        App::new()
            .wrap_fn(move |req, srv| {
                let context = RequestContext::capture(req.request());
                let span = context.span();
                let metrics = metrics.clone();

                let fut = span.in_scope(|| srv.call(req));
                async move {
                    let mut response = fut.await?;
                    response.headers_mut().insert(
                        HeaderName::from_static("x-request-id"),
                        HeaderValue::from_str(&context.request_id)
                            .unwrap_or_else(|_| HeaderValue::from_static("invalid-request-id")),
                    );

                    let status = response.status().as_u16();
                    let latency_ms = context.finish(response.request(), status);
                    metrics.record_request(status, latency_ms);
                    capture_unexpected_5xx(
                        &context.path,
                        &context.method,
                        status,
                        &context.request_id,
                    );
                    Ok::<_, actix_web::Error>(response)
                }
                .instrument(span)
            })
            .wrap(cors_middleware(&security_config))
            .wrap(security_headers())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(auth_config.clone()))
            .configure(routes::configure)
    })
    .bind((bind_host, bind_port))?
    .run()
    .await?;

    Ok(())
}
