use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::message::PriceRange;

/// Catalog record as seen by the negotiation flow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub artisan_profile_id: Uuid,
    pub name: String,
    pub base_price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_offered_by(&self, artisan_profile_id: Uuid) -> bool {
        self.is_active && self.artisan_profile_id == artisan_profile_id
    }

    /// Price band quoted when the customer does not propose one:
    /// `base * quantity` up to one and a half times that, in whole cents.
    pub fn estimate_for(&self, quantity: i32) -> PriceRange {
        let min = self.base_price * Decimal::from(quantity);
        let max = (min * Decimal::new(15, 1))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        PriceRange { min, max }
    }
}
