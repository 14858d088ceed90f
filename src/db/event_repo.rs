use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Event;

pub async fn get_event(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<Event>> {
    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(event)
}

/// Profile ids of everyone following an event. Broadcast fan-out audience.
pub async fn get_follower_ids(pool: &PgPool, event_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
    let rows: Vec<(Uuid,)> =
        sqlx::query_as("SELECT profile_id FROM event_followers WHERE event_id = $1")
            .bind(event_id)
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}
