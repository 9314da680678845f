pub mod auth_config;
pub mod database_config;
pub mod defaults;
pub mod messaging_config;
pub mod security_config;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

pub use auth_config::{AuthConfig, ConfigError};
pub use database_config::DatabaseConfig;
pub use messaging_config::MessagingConfig;
pub use security_config::SecurityConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "defaults::default_host")]
    pub host: String,
    #[serde(default = "defaults::default_port")]
    pub port: u16,
    #[serde(default = "defaults::default_environment")]
    pub environment: String,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub messaging: MessagingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "defaults::default_logging_level")]
    pub level: String,
    #[serde(default = "defaults::default_logging_json_format")]
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::default_logging_level(),
            json_format: defaults::default_logging_json_format(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Box<figment::Error>> {
        let mut config: Self = Self::figment().extract().map_err(Box::new)?;
        config.security.metrics_admin_token =
            defaults::normalize_optional_string(config.security.metrics_admin_token);
        Ok(config)
    }

    /// Layering: `config/default.toml`, `config/development.toml`, prefixed
    /// environment variables, then the bare well-known variables.
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Toml::file("config/development.toml"))
            .merge(Env::prefixed("APP_").split("__"))
            .merge(Env::prefixed("DATABASE_").split("__").map(|key| {
                format!("database.{}", key.as_str()).into()
            }))
            .merge(Env::prefixed("AUTH_").split("__").map(|key| {
                format!("auth.{}", key.as_str()).into()
            }))
            .merge(Env::prefixed("SECURITY_").split("__").map(|key| {
                format!("security.{}", key.as_str()).into()
            }))
            .merge(Env::prefixed("LOGGING_").split("__").map(|key| {
                format!("logging.{}", key.as_str()).into()
            }))
            .merge(Env::prefixed("MESSAGING_").split("__").map(|key| {
                format!("messaging.{}", key.as_str()).into()
            }))
            .merge(
                Env::raw()
                    .only(&["DATABASE_URL", "JWT_SECRET"])
                    .map(|key| match key.as_str() {
                        "DATABASE_URL" => "database.url".into(),
                        "JWT_SECRET" => "auth.jwt_secret".into(),
                        _ => key.into(),
                    }),
            )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.validate()?;
        self.messaging.validate()
    }
}
