use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub offer_id: Uuid,
    /// Idempotency key shared with the payment gateway.
    pub reference: String,
    /// Minor currency units.
    pub amount_paid: i64,
    pub payment_status: String,
    pub refund_status: String,
    /// Platform commission in minor units; 0 until acceptance sets it once.
    pub platform_fee: i64,
    pub transfer_status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Payment {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }

    pub fn is_refunded(&self) -> bool {
        self.refund_status == "refunded"
    }

    pub fn is_transferred(&self) -> bool {
        self.transfer_status == "transferred"
    }
}
