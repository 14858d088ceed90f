use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub notification_type: String,
    pub recipient_profile_id: Uuid,
    pub actor_profile_id: Option<Uuid>,
    pub data: serde_json::Value,
    pub created_at: Option<DateTime<Utc>>,
}
