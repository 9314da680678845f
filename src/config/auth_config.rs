use std::fmt;

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT secret must be set to a non-default value")]
    MissingJwtSecret,
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "crate::config::defaults::default_jwt_kid")]
    pub jwt_kid: String,
    #[serde(default)]
    pub previous_jwt_secrets: Vec<String>,
    #[serde(default)]
    pub previous_jwt_kids: Vec<String>,
    #[serde(default = "crate::config::defaults::default_jwt_expiration_seconds")]
    pub jwt_expiration_seconds: u64,
    #[serde(default = "crate::config::defaults::default_jwt_issuer")]
    pub issuer: String,
    #[serde(default = "crate::config::defaults::default_jwt_audience")]
    pub audience: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_kid", &self.jwt_kid)
            .field("previous_jwt_secrets", &"[REDACTED]")
            .field("previous_jwt_kids", &self.previous_jwt_kids)
            .field("jwt_expiration_seconds", &self.jwt_expiration_seconds)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secret = self.jwt_secret.trim();
        if secret.is_empty() || secret == "change-me-in-production" {
            return Err(ConfigError::MissingJwtSecret);
        }
        if self.previous_jwt_secrets.len() != self.previous_jwt_kids.len() {
            return Err(ConfigError::Invalid(
                "auth.previous_jwt_secrets and auth.previous_jwt_kids must have the same length"
                    .to_string(),
            ));
        }
        if self.jwt_expiration_seconds == 0 {
            return Err(ConfigError::Invalid(
                "auth.jwt_expiration_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
