use craft_market_backend::config::{AppConfig, ConfigError};
use std::env;

use crate::{cleanup_env_vars, SERIALIZE};

fn load() -> AppConfig {
    AppConfig::from_env().expect("config should load")
}

#[test]
fn defaults_come_from_the_bundled_toml() {
    let _lock = SERIALIZE.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let config = load();

    assert_eq!(config.port, 8080);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.messaging.max_content_length, 5000);
    assert_eq!(config.messaging.default_message_page_size, 50);
    assert_eq!(config.messaging.default_conversation_page_size, 20);
    assert_eq!(config.messaging.max_page_size, 100);
    assert!(config.security.metrics_allow_private_only);
    assert!(config.security.metrics_admin_token.is_none());
}

#[test]
fn bare_well_known_variables_override_the_file() {
    let _lock = SERIALIZE.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    env::set_var("DATABASE_URL", "postgres://db-host/market");
    env::set_var("JWT_SECRET", "a-strong-secret");
    let config = load();
    cleanup_env_vars();

    assert_eq!(config.database.url, "postgres://db-host/market");
    assert_eq!(config.auth.jwt_secret, "a-strong-secret");
    assert!(config.validate().is_ok());
}

#[test]
fn prefixed_variables_reach_nested_sections() {
    let _lock = SERIALIZE.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    env::set_var("APP_PORT", "9090");
    env::set_var("APP_DATABASE__MAX_CONNECTIONS", "25");
    env::set_var("APP_MESSAGING__MAX_CONTENT_LENGTH", "280");
    env::set_var("MESSAGING_MAX_PAGE_SIZE", "60");
    env::set_var("LOGGING_LEVEL", "debug");
    env::set_var("AUTH_ISSUER", "issuer-from-env");
    let config = load();
    cleanup_env_vars();

    assert_eq!(config.port, 9090);
    assert_eq!(config.database.max_connections, 25);
    assert_eq!(config.messaging.max_content_length, 280);
    assert_eq!(config.messaging.max_page_size, 60);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.auth.issuer, "issuer-from-env");
}

#[test]
fn invalid_port_fails_to_load() {
    let _lock = SERIALIZE.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    env::set_var("APP_PORT", "not-a-port");
    let result = AppConfig::from_env();
    cleanup_env_vars();

    assert!(result.is_err());
}

#[test]
fn cors_origins_parse_from_a_list() {
    let _lock = SERIALIZE.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    env::set_var(
        "APP_SECURITY__CORS_ALLOWED_ORIGINS",
        "[\"https://shop.example\", \"https://admin.example\"]",
    );
    let config = load();
    cleanup_env_vars();

    assert_eq!(
        config.security.cors_allowed_origins,
        vec![
            "https://shop.example".to_string(),
            "https://admin.example".to_string()
        ]
    );
}

#[test]
fn placeholder_secret_fails_validation() {
    let _lock = SERIALIZE.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let config = load();

    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingJwtSecret)
    ));
}

#[test]
fn oversized_default_page_fails_validation() {
    let _lock = SERIALIZE.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    env::set_var("JWT_SECRET", "a-strong-secret");
    env::set_var("MESSAGING_MAX_PAGE_SIZE", "10");
    let config = load();
    cleanup_env_vars();

    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}
