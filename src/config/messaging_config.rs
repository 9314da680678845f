use serde::Deserialize;

use super::defaults;
use super::ConfigError;

/// Limits applied to conversation and message traffic.
#[derive(Debug, Deserialize, Clone)]
pub struct MessagingConfig {
    #[serde(default = "defaults::default_max_content_length")]
    pub max_content_length: usize,
    #[serde(default = "defaults::default_message_page_size")]
    pub default_message_page_size: u32,
    #[serde(default = "defaults::default_conversation_page_size")]
    pub default_conversation_page_size: u32,
    #[serde(default = "defaults::default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            max_content_length: defaults::default_max_content_length(),
            default_message_page_size: defaults::default_message_page_size(),
            default_conversation_page_size: defaults::default_conversation_page_size(),
            max_page_size: defaults::default_max_page_size(),
        }
    }
}

impl MessagingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_content_length == 0 {
            return Err(ConfigError::Invalid(
                "messaging.max_content_length must be positive".to_string(),
            ));
        }
        if self.max_page_size == 0 {
            return Err(ConfigError::Invalid(
                "messaging.max_page_size must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("default_message_page_size", self.default_message_page_size),
            (
                "default_conversation_page_size",
                self.default_conversation_page_size,
            ),
        ] {
            if value == 0 || value > self.max_page_size {
                return Err(ConfigError::Invalid(format!(
                    "messaging.{name} must be between 1 and {}",
                    self.max_page_size
                )));
            }
        }
        Ok(())
    }

    /// Resolves a requested page size against the configured default and cap.
    pub fn clamp_limit(&self, requested: Option<u32>, default: u32) -> u32 {
        requested.unwrap_or(default).clamp(1, self.max_page_size)
    }
}
