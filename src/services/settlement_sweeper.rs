use std::sync::Arc;

use metrics::counter;
use sqlx::PgPool;
use tokio::time::{interval, Duration};

use crate::db::{checkout_repo, payment_repo};
use crate::payments::PaymentGateway;

/// Out-of-band settlement loop. A decline always succeeds even when the
/// refund plumbing is down, and an acceptance commits before the
/// commission moves; this sweeper periodically retries whatever money
/// movement is still outstanding.
pub async fn run_settlement_sweeper(
    pool: PgPool,
    gateway: Arc<dyn PaymentGateway>,
    platform_account: String,
    sweep_interval_secs: u64,
) {
    let mut ticker = interval(Duration::from_secs(sweep_interval_secs));
    tracing::info!(
        interval_secs = sweep_interval_secs,
        "Settlement sweeper started"
    );

    loop {
        ticker.tick().await;

        sweep_refunds(&pool, gateway.as_ref()).await;
        sweep_transfers(&pool, gateway.as_ref(), &platform_account).await;
        sweep_expired_checkouts(&pool).await;
    }
}

/// One expired-checkout cleanup pass. Abandoned sessions would otherwise
/// accumulate forever.
pub async fn sweep_expired_checkouts(pool: &PgPool) {
    match checkout_repo::delete_expired(pool).await {
        Ok(0) => {}
        Ok(n) => tracing::info!(count = n, "Sweeper: expired checkout sessions removed"),
        Err(e) => tracing::error!(error = %e, "Sweeper: failed to delete expired checkouts"),
    }
}

/// One refund pass. Public so a single sweep can be driven directly.
pub async fn sweep_refunds(pool: &PgPool, gateway: &dyn PaymentGateway) {
    let pending = match payment_repo::get_unrefunded_declines(pool).await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "Sweeper: failed to fetch unrefunded declines");
            return;
        }
    };

    if pending.is_empty() {
        return;
    }
    tracing::debug!(count = pending.len(), "Sweeper: retrying refunds");

    for payment in &pending {
        match gateway.refund(&payment.reference).await {
            Ok(outcome) if outcome.refunded => {
                if let Err(e) = payment_repo::mark_refunded(pool, payment.id).await {
                    tracing::error!(
                        payment_id = %payment.id,
                        error = %e,
                        "Sweeper: refund succeeded but status update failed"
                    );
                    continue;
                }
                counter!("refunds_issued_total").increment(1);
                tracing::info!(
                    payment_id = %payment.id,
                    reference = %payment.reference,
                    amount = payment.amount_paid,
                    "Sweeper: refund settled"
                );
            }
            Ok(_) => {
                tracing::warn!(
                    payment_id = %payment.id,
                    reference = %payment.reference,
                    "Sweeper: gateway did not refund — will retry next sweep"
                );
            }
            Err(e) => {
                tracing::warn!(
                    payment_id = %payment.id,
                    reference = %payment.reference,
                    error = %e,
                    "Sweeper: refund attempt failed"
                );
            }
        }
    }
}

/// One commission-transfer pass.
pub async fn sweep_transfers(pool: &PgPool, gateway: &dyn PaymentGateway, platform_account: &str) {
    let pending = match payment_repo::get_untransferred_commissions(pool).await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "Sweeper: failed to fetch untransferred commissions");
            return;
        }
    };

    if pending.is_empty() {
        return;
    }
    tracing::debug!(count = pending.len(), "Sweeper: retrying commission transfers");

    for payment in &pending {
        match gateway
            .transfer(&payment.reference, payment.platform_fee, platform_account)
            .await
        {
            Ok(outcome) if outcome.transferred => {
                if let Err(e) = payment_repo::mark_transferred(pool, payment.id).await {
                    tracing::error!(
                        payment_id = %payment.id,
                        error = %e,
                        "Sweeper: transfer succeeded but status update failed"
                    );
                    continue;
                }
                counter!("commission_transfers_total").increment(1);
                tracing::info!(
                    payment_id = %payment.id,
                    reference = %payment.reference,
                    commission = payment.platform_fee,
                    "Sweeper: commission settled"
                );
            }
            Ok(_) => {
                tracing::warn!(
                    payment_id = %payment.id,
                    reference = %payment.reference,
                    "Sweeper: gateway did not transfer — will retry next sweep"
                );
            }
            Err(e) => {
                tracing::warn!(
                    payment_id = %payment.id,
                    reference = %payment.reference,
                    error = %e,
                    "Sweeper: transfer attempt failed"
                );
            }
        }
    }
}
