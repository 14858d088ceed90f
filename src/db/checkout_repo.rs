use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::{CheckoutSession, Side};

pub async fn insert_session(
    pool: &PgPool,
    reference: &str,
    bout_id: Uuid,
    side: Side,
    sender_id: Uuid,
    fighter_id: Uuid,
    amount: i64,
    checkout_url: &str,
) -> anyhow::Result<CheckoutSession> {
    let session = sqlx::query_as::<_, CheckoutSession>(
        r#"
        INSERT INTO checkout_sessions
            (reference, bout_id, side, sender_id, fighter_id, amount, checkout_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(reference)
    .bind(bout_id)
    .bind(side.as_str())
    .bind(sender_id)
    .bind(fighter_id)
    .bind(amount)
    .bind(checkout_url)
    .fetch_one(pool)
    .await?;

    Ok(session)
}

pub async fn get_unconsumed_by_reference(
    pool: &PgPool,
    reference: &str,
) -> anyhow::Result<Option<CheckoutSession>> {
    let session = sqlx::query_as::<_, CheckoutSession>(
        "SELECT * FROM checkout_sessions WHERE reference = $1 AND consumed = FALSE",
    )
    .bind(reference)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

/// Remove sessions past their expiry, consumed or not. Returns the number
/// of rows dropped.
pub async fn delete_expired(pool: &PgPool) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM checkout_sessions WHERE expires_at < NOW()")
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Mark a session consumed. Conditional, so a retried webhook delivery for
/// the same reference is a no-op.
pub async fn consume<'e, E>(ex: E, id: Uuid) -> anyhow::Result<bool>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE checkout_sessions SET consumed = TRUE WHERE id = $1 AND consumed = FALSE",
    )
    .bind(id)
    .execute(ex)
    .await?;

    Ok(result.rows_affected() > 0)
}
