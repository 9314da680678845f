use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Artisan,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer" => Some(Self::Customer),
            "artisan" => Some(Self::Artisan),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Artisan => "artisan",
            Self::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name shown next to messages: full name, then username, then email.
    pub fn display_name(&self) -> String {
        self.full_name
            .as_deref()
            .or(self.username.as_deref())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
            .to_string()
    }
}

/// Seller-side entity. Conversations bind to the profile, not the owning user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ArtisanProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub created_at: DateTime<Utc>,
}
