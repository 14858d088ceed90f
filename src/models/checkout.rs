use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Offer intent awaiting payment confirmation. Created alongside the
/// gateway checkout; consumed exactly once by the confirming webhook.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CheckoutSession {
    pub id: Uuid,
    pub reference: String,
    pub bout_id: Uuid,
    pub side: String,
    pub sender_id: Uuid,
    pub fighter_id: Uuid,
    pub amount: i64,
    pub checkout_url: String,
    pub consumed: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}
