use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Notification;

/// Insert a notification row. Runs on the service's own pool, which is the
/// elevated write path: broadcast inserts read follower relationships the
/// acting user does not own, so they must not be gated by that user's
/// row-level permissions.
pub async fn insert_notification(
    pool: &PgPool,
    notification_type: &str,
    recipient_profile_id: Uuid,
    actor_profile_id: Option<Uuid>,
    data: &serde_json::Value,
) -> anyhow::Result<Notification> {
    let notification = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (notification_type, recipient_profile_id, actor_profile_id, data)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(notification_type)
    .bind(recipient_profile_id)
    .bind(actor_profile_id)
    .bind(data)
    .fetch_one(pool)
    .await?;

    Ok(notification)
}

pub async fn list_for_recipient(
    pool: &PgPool,
    recipient_profile_id: Uuid,
) -> anyhow::Result<Vec<Notification>> {
    let notifications = sqlx::query_as::<_, Notification>(
        r#"
        SELECT * FROM notifications
        WHERE recipient_profile_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(recipient_profile_id)
    .fetch_all(pool)
    .await?;

    Ok(notifications)
}
