use metrics::counter;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{event_repo, notification_repo};
use crate::models::NotificationType;

/// Emit a targeted notification. Failures are logged and swallowed; by the
/// time fan-out runs, the roster mutation and payment settlement have
/// already committed, so a failed insert must never fail the request.
pub async fn notify(
    pool: &PgPool,
    notification_type: NotificationType,
    recipient_profile_id: Uuid,
    actor_profile_id: Option<Uuid>,
    data: serde_json::Value,
) {
    match notification_repo::insert_notification(
        pool,
        notification_type.as_str(),
        recipient_profile_id,
        actor_profile_id,
        &data,
    )
    .await
    {
        Ok(_) => {
            counter!("notifications_emitted_total").increment(1);
        }
        Err(e) => {
            tracing::warn!(
                notification_type = %notification_type,
                recipient = %recipient_profile_id,
                error = %e,
                "Failed to insert notification"
            );
        }
    }
}

/// Broadcast to every follower of an event.
pub async fn notify_followers(
    pool: &PgPool,
    event_id: Uuid,
    actor_profile_id: Option<Uuid>,
    notification_type: NotificationType,
    data: serde_json::Value,
) {
    let followers = match event_repo::get_follower_ids(pool, event_id).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(
                event_id = %event_id,
                error = %e,
                "Failed to load event followers — skipping broadcast"
            );
            return;
        }
    };

    tracing::debug!(
        event_id = %event_id,
        followers = followers.len(),
        notification_type = %notification_type,
        "Broadcasting to event followers"
    );

    for follower_id in followers {
        notify(
            pool,
            notification_type,
            follower_id,
            actor_profile_id,
            data.clone(),
        )
        .await;
    }
}
