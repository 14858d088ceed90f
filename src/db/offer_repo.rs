use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::{Offer, OfferStatus, Side};

/// Insert a new pending offer.
///
/// Returns the raw sqlx error so the caller can translate a violation of
/// the `uniq_offers_active_triple` index into a duplicate-offer conflict.
pub async fn insert_offer<'e, E>(
    ex: E,
    bout_id: Uuid,
    side: Side,
    sender_id: Uuid,
    fighter_id: Uuid,
) -> sqlx::Result<Offer>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Offer>(
        r#"
        INSERT INTO offers (bout_id, side, sender_id, fighter_id, status)
        VALUES ($1, $2, $3, $4, 'pending')
        RETURNING *
        "#,
    )
    .bind(bout_id)
    .bind(side.as_str())
    .bind(sender_id)
    .bind(fighter_id)
    .fetch_one(ex)
    .await
}

pub async fn get_offer(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<Offer>> {
    let offer = sqlx::query_as::<_, Offer>("SELECT * FROM offers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(offer)
}

/// Find a non-terminal offer for the (bout, side, fighter) triple.
pub async fn find_active_offer(
    pool: &PgPool,
    bout_id: Uuid,
    side: Side,
    fighter_id: Uuid,
) -> anyhow::Result<Option<Offer>> {
    let offer = sqlx::query_as::<_, Offer>(
        r#"
        SELECT * FROM offers
        WHERE bout_id = $1 AND side = $2 AND fighter_id = $3
          AND status IN ('pending', 'accepted')
        LIMIT 1
        "#,
    )
    .bind(bout_id)
    .bind(side.as_str())
    .bind(fighter_id)
    .fetch_optional(pool)
    .await?;

    Ok(offer)
}

pub async fn list_offers_for_bout(pool: &PgPool, bout_id: Uuid) -> anyhow::Result<Vec<Offer>> {
    let offers = sqlx::query_as::<_, Offer>(
        "SELECT * FROM offers WHERE bout_id = $1 ORDER BY created_at DESC",
    )
    .bind(bout_id)
    .fetch_all(pool)
    .await?;

    Ok(offers)
}

/// Flip a pending offer to a terminal status. Conditional on the offer
/// still being pending; returns None when it was already terminal (or
/// missing), which is the storage-level terminal-immutability guard.
pub async fn resolve_pending<'e, E>(
    ex: E,
    id: Uuid,
    status: OfferStatus,
) -> anyhow::Result<Option<Offer>>
where
    E: PgExecutor<'e>,
{
    let offer = sqlx::query_as::<_, Offer>(
        r#"
        UPDATE offers
        SET status = $2, resolved_at = NOW()
        WHERE id = $1 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .fetch_optional(ex)
    .await?;

    Ok(offer)
}
