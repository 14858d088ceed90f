use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{OfferStatus, Side};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Offer {
    pub id: Uuid,
    pub bout_id: Uuid,
    pub side: String,
    pub sender_id: Uuid,
    pub fighter_id: Uuid,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Offer {
    /// The side column is CHECK-constrained, so a stored row always parses.
    pub fn side(&self) -> Side {
        Side::from_api_str(&self.side).unwrap_or(Side::Red)
    }

    pub fn status(&self) -> OfferStatus {
        OfferStatus::from_store_str(&self.status).unwrap_or(OfferStatus::Pending)
    }
}
