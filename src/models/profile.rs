use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Role;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    /// Free-form role text from the store; use [`Profile::role`] in logic.
    pub role: String,
    pub gym_username: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn role(&self) -> Option<Role> {
        Role::from_store_str(&self.role)
    }

    /// Name shown on the bout card: display name, falling back to username.
    pub fn card_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}
