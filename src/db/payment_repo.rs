use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::Payment;

pub async fn insert_payment<'e, E>(
    ex: E,
    offer_id: Uuid,
    reference: &str,
    amount_paid: i64,
) -> anyhow::Result<Payment>
where
    E: PgExecutor<'e>,
{
    let payment = sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments (offer_id, reference, amount_paid, payment_status)
        VALUES ($1, $2, $3, 'paid')
        RETURNING *
        "#,
    )
    .bind(offer_id)
    .bind(reference)
    .bind(amount_paid)
    .fetch_one(ex)
    .await?;

    Ok(payment)
}

pub async fn get_by_offer(pool: &PgPool, offer_id: Uuid) -> anyhow::Result<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE offer_id = $1")
        .bind(offer_id)
        .fetch_optional(pool)
        .await?;

    Ok(payment)
}

/// Record a completed refund. Conditional on `refund_status = 'none'`, so a
/// retried decline can never double-mark (or double-refund via the caller's
/// pre-check).
pub async fn mark_refunded<'e, E>(ex: E, payment_id: Uuid) -> anyhow::Result<bool>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE payments
        SET refund_status = 'refunded', updated_at = NOW()
        WHERE id = $1 AND refund_status = 'none'
        "#,
    )
    .bind(payment_id)
    .execute(ex)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Set the platform commission. Conditional on `platform_fee = 0`: the fee
/// is computed at most once per payment, no matter how often acceptance
/// logic is invoked.
pub async fn set_platform_fee<'e, E>(ex: E, payment_id: Uuid, fee: i64) -> anyhow::Result<bool>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE payments
        SET platform_fee = $2, updated_at = NOW()
        WHERE id = $1 AND platform_fee = 0
        "#,
    )
    .bind(payment_id)
    .bind(fee)
    .execute(ex)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn mark_transferred<'e, E>(ex: E, payment_id: Uuid) -> anyhow::Result<bool>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE payments
        SET transfer_status = 'transferred', updated_at = NOW()
        WHERE id = $1 AND transfer_status = 'none'
        "#,
    )
    .bind(payment_id)
    .execute(ex)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Payments on declined offers whose refund has not gone through yet.
pub async fn get_unrefunded_declines(pool: &PgPool) -> anyhow::Result<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(
        r#"
        SELECT p.* FROM payments p
        JOIN offers o ON o.id = p.offer_id
        WHERE o.status = 'declined'
          AND p.payment_status = 'paid'
          AND p.refund_status = 'none'
        ORDER BY p.updated_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(payments)
}

/// Payments on accepted offers whose commission transfer has not settled.
pub async fn get_untransferred_commissions(pool: &PgPool) -> anyhow::Result<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(
        r#"
        SELECT p.* FROM payments p
        JOIN offers o ON o.id = p.offer_id
        WHERE o.status = 'accepted'
          AND p.platform_fee > 0
          AND p.transfer_status = 'none'
        ORDER BY p.updated_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(payments)
}
