use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Side;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bout {
    pub id: Uuid,
    pub event_id: Uuid,
    pub weight_class: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,

    pub red_fighter_id: Option<Uuid>,
    pub red_name: Option<String>,
    pub red_seeking_opponent: bool,

    pub blue_fighter_id: Option<Uuid>,
    pub blue_name: Option<String>,
    pub blue_seeking_opponent: bool,

    /// Offer fee in minor currency units. None or 0 means offers are free.
    pub offer_fee: Option<i64>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Bout {
    pub fn fighter_on(&self, side: Side) -> Option<Uuid> {
        match side {
            Side::Red => self.red_fighter_id,
            Side::Blue => self.blue_fighter_id,
        }
    }

    pub fn fee(&self) -> i64 {
        self.offer_fee.unwrap_or(0)
    }
}
