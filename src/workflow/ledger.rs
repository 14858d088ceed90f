use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::{bout_repo, checkout_repo, event_repo, offer_repo, payment_repo, profile_repo};
use crate::models::{
    Bout, Decision, Event, NotificationType, Offer, OfferStatus, Payment, Side,
};
use crate::payments::PaymentGateway;

use super::{conflict, fanout, roster, uniqueness, WorkflowError};

/// Result of an offer creation request. When the bout carries a fee and
/// webhook confirmation is enabled, no offer exists yet: the caller gets a
/// checkout URL and the offer is written once the gateway confirms payment.
#[derive(Debug)]
pub enum CreateOfferOutcome {
    Created {
        offer: Offer,
        payment: Option<Payment>,
    },
    CheckoutPending {
        reference: String,
        checkout_url: String,
    },
}

/// Owns the offer state machine (`pending → accepted | declined`) and
/// orchestrates the guards, the payment gateway and the notification
/// fan-out around each transition.
pub struct OfferLedger {
    pool: PgPool,
    gateway: Arc<dyn PaymentGateway>,
    fee_rate: Decimal,
    platform_account: String,
    webhook_confirm: bool,
}

impl OfferLedger {
    pub fn new(pool: PgPool, gateway: Arc<dyn PaymentGateway>, config: &AppConfig) -> Self {
        Self {
            pool,
            gateway,
            fee_rate: config.platform_fee_rate,
            platform_account: config.platform_account.clone(),
            webhook_confirm: config.payment_webhook_secret.is_some(),
        }
    }

    /// Platform commission on a paid offer fee, in minor units.
    fn commission(&self, amount_paid: i64) -> i64 {
        (Decimal::from(amount_paid) * self.fee_rate)
            .round()
            .to_i64()
            .unwrap_or(0)
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    pub async fn create_offer(
        &self,
        bout_id: Uuid,
        side: Side,
        sender_id: Uuid,
        fighter_id: Uuid,
    ) -> Result<CreateOfferOutcome, WorkflowError> {
        let sender = profile_repo::get_profile(&self.pool, sender_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("sender profile not found".into()))?;

        let role = sender.role().ok_or_else(|| {
            WorkflowError::Validation(format!("unrecognized profile role '{}'", sender.role))
        })?;
        if !role.can_send_offers() {
            return Err(WorkflowError::Validation(
                "only coach and gym profiles may send bout offers".into(),
            ));
        }

        uniqueness::check_no_existing_offer(&self.pool, bout_id, side, fighter_id).await?;

        let bout = bout_repo::get_bout(&self.pool, bout_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("bout not found".into()))?;
        let fighter = profile_repo::get_profile(&self.pool, fighter_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("fighter profile not found".into()))?;

        let fee = bout.fee();
        if fee > 0 {
            // A checkout failure or timeout aborts the whole operation:
            // no offer row may exist without its confirmed payment.
            let reference = Uuid::new_v4().to_string();
            let checkout = self
                .gateway
                .create_checkout(&reference, bout.id, fighter.id, side, fee)
                .await?;

            if self.webhook_confirm {
                checkout_repo::insert_session(
                    &self.pool,
                    &reference,
                    bout.id,
                    side,
                    sender_id,
                    fighter_id,
                    fee,
                    &checkout.url,
                )
                .await?;

                tracing::info!(
                    bout_id = %bout.id,
                    side = %side,
                    fighter_id = %fighter_id,
                    reference,
                    amount = fee,
                    "Checkout created — offer awaits payment confirmation"
                );

                return Ok(CreateOfferOutcome::CheckoutPending {
                    reference,
                    checkout_url: checkout.url,
                });
            }

            // Legacy path: the gateway confirmed the charge synchronously.
            // The offer and its payment record land in one transaction; a
            // charged fee must never sit behind a half-written pair.
            let persisted: Result<(Offer, Payment), WorkflowError> = async {
                let mut tx = self.pool.begin().await?;
                let offer =
                    offer_repo::insert_offer(&mut *tx, bout.id, side, sender_id, fighter_id)
                        .await
                        .map_err(uniqueness::map_offer_insert_err)?;
                let payment =
                    payment_repo::insert_payment(&mut *tx, offer.id, &reference, fee).await?;
                tx.commit().await?;
                Ok((offer, payment))
            }
            .await;

            let (offer, payment) = match persisted {
                Ok(pair) => pair,
                Err(err) => {
                    // Nothing was written (a duplicate raced past the
                    // pre-check, or the write pair failed), so no payment
                    // row exists for the sweeper. Return the money now.
                    self.refund_stranded_charge(&reference).await;
                    return Err(err);
                }
            };

            counter!("offers_created_total").increment(1);
            tracing::info!(
                offer_id = %offer.id,
                bout_id = %bout.id,
                side = %side,
                amount = fee,
                "Offer created with paid fee"
            );

            self.notify_offer_created(&bout, &offer, fighter.card_name())
                .await;

            return Ok(CreateOfferOutcome::Created {
                offer,
                payment: Some(payment),
            });
        }

        let offer = offer_repo::insert_offer(&self.pool, bout.id, side, sender_id, fighter_id)
            .await
            .map_err(uniqueness::map_offer_insert_err)?;

        counter!("offers_created_total").increment(1);
        tracing::info!(
            offer_id = %offer.id,
            bout_id = %bout.id,
            side = %side,
            fighter_id = %fighter_id,
            "Offer created"
        );

        self.notify_offer_created(&bout, &offer, fighter.card_name())
            .await;

        Ok(CreateOfferOutcome::Created {
            offer,
            payment: None,
        })
    }

    /// Webhook-confirmed write: turn a paid checkout session into an offer
    /// plus its payment record. Idempotent per reference — a redelivered
    /// webhook finds the session consumed and does nothing.
    pub async fn confirm_checkout(
        &self,
        reference: &str,
    ) -> Result<Option<Offer>, WorkflowError> {
        let Some(session) = checkout_repo::get_unconsumed_by_reference(&self.pool, reference).await?
        else {
            tracing::info!(reference, "Webhook for unknown or consumed checkout — ignoring");
            return Ok(None);
        };

        let side = Side::from_api_str(&session.side).unwrap_or(Side::Red);

        // Offer, payment and session consumption commit or roll back
        // together: a crash mid-write leaves the session unconsumed and no
        // orphaned pending offer, and the redelivered webhook simply runs
        // the whole write again.
        let mut tx = self.pool.begin().await?;

        match offer_repo::insert_offer(
            &mut *tx,
            session.bout_id,
            side,
            session.sender_id,
            session.fighter_id,
        )
        .await
        {
            Ok(offer) => {
                payment_repo::insert_payment(&mut *tx, offer.id, &session.reference, session.amount)
                    .await?;
                checkout_repo::consume(&mut *tx, session.id).await?;
                tx.commit().await?;

                counter!("offers_created_total").increment(1);
                tracing::info!(
                    offer_id = %offer.id,
                    reference,
                    amount = session.amount,
                    "Offer persisted from confirmed checkout"
                );

                if let Ok(Some(bout)) = bout_repo::get_bout(&self.pool, session.bout_id).await {
                    let fighter_name = profile_repo::get_profile(&self.pool, session.fighter_id)
                        .await
                        .ok()
                        .flatten()
                        .map(|p| p.card_name().to_string())
                        .unwrap_or_default();
                    self.notify_offer_created(&bout, &offer, &fighter_name).await;
                }

                Ok(Some(offer))
            }
            Err(e) => {
                tx.rollback().await.ok();
                let err = uniqueness::map_offer_insert_err(e);
                if let WorkflowError::Conflict(_) = &err {
                    // A duplicate offer landed while this checkout was in
                    // flight. Refund the confirmed charge so the money is
                    // not stranded against an offer that will never exist.
                    tracing::warn!(
                        reference,
                        bout_id = %session.bout_id,
                        "Confirmed checkout collides with existing offer — refunding"
                    );
                    self.refund_stranded_charge(&session.reference).await;
                    checkout_repo::consume(&self.pool, session.id).await?;
                }
                Err(err)
            }
        }
    }

    /// Best-effort refund of a confirmed charge that could not be paired
    /// with a persisted offer. No payment row exists, so the sweeper cannot
    /// pick this up; a failed refund needs manual reconciliation.
    async fn refund_stranded_charge(&self, reference: &str) {
        match self.gateway.refund(reference).await {
            Ok(outcome) if outcome.refunded => {
                counter!("refunds_issued_total").increment(1);
                tracing::info!(reference, "Stranded charge refunded");
            }
            Ok(_) => {
                counter!("refund_failures_total").increment(1);
                tracing::error!(
                    reference,
                    "Gateway did not refund stranded charge — needs manual reconciliation"
                );
            }
            Err(e) => {
                counter!("refund_failures_total").increment(1);
                tracing::error!(
                    reference,
                    error = %e,
                    "Failed to refund stranded charge — needs manual reconciliation"
                );
            }
        }
    }

    async fn notify_offer_created(&self, bout: &Bout, offer: &Offer, fighter_name: &str) {
        let owner = match event_repo::get_event(&self.pool, bout.event_id).await {
            Ok(Some(event)) => event.owner_profile_id,
            Ok(None) => {
                tracing::warn!(event_id = %bout.event_id, "Bout references missing event");
                return;
            }
            Err(e) => {
                tracing::warn!(event_id = %bout.event_id, error = %e, "Event lookup failed");
                return;
            }
        };

        fanout::notify(
            &self.pool,
            NotificationType::BoutOffer,
            owner,
            Some(offer.sender_id),
            json!({
                "offer_id": offer.id,
                "bout_id": bout.id,
                "event_id": bout.event_id,
                "side": offer.side,
                "fighter_id": offer.fighter_id,
                "fighter_name": fighter_name,
            }),
        )
        .await;
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    pub async fn resolve_offer(
        &self,
        offer_id: Uuid,
        decision: Decision,
        actor_id: Uuid,
    ) -> Result<Offer, WorkflowError> {
        let start = Instant::now();

        let offer = offer_repo::get_offer(&self.pool, offer_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("offer not found".into()))?;
        let bout = bout_repo::get_bout(&self.pool, offer.bout_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("bout not found".into()))?;
        let event = event_repo::get_event(&self.pool, bout.event_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("event not found".into()))?;

        // Authorization is an upstream concern, but checked here too.
        if event.owner_profile_id != actor_id {
            return Err(WorkflowError::Forbidden(
                "only the event owner may resolve offers".into(),
            ));
        }

        if offer.status().is_terminal() {
            return Err(WorkflowError::InvalidTransition(format!(
                "offer is already {}",
                offer.status
            )));
        }

        let result = match decision {
            Decision::Accept => self.accept(offer, bout, event).await,
            Decision::Decline => self.decline(offer, event).await,
        };

        histogram!("offer_resolve_seconds").record(start.elapsed().as_secs_f64());
        result
    }

    async fn decline(&self, offer: Offer, event: Event) -> Result<Offer, WorkflowError> {
        let offer = offer_repo::resolve_pending(&self.pool, offer.id, OfferStatus::Declined)
            .await?
            .ok_or_else(|| {
                WorkflowError::InvalidTransition("offer is already resolved".into())
            })?;

        counter!("offers_declined_total").increment(1);
        tracing::info!(offer_id = %offer.id, "Offer declined");

        let fighter_name = profile_repo::get_profile(&self.pool, offer.fighter_id)
            .await
            .ok()
            .flatten()
            .map(|p| p.card_name().to_string())
            .unwrap_or_default();

        // Refund is a best-effort side effect: the declined status is the
        // source of truth, and a failed refund is retried by the sweeper.
        let mut refund_amount = 0i64;
        let mut refunded = false;
        if let Some(payment) = payment_repo::get_by_offer(&self.pool, offer.id).await? {
            refund_amount = payment.amount_paid;
            if payment.is_refunded() {
                refunded = true;
            } else if payment.is_paid() {
                match self.gateway.refund(&payment.reference).await {
                    Ok(outcome) if outcome.refunded => {
                        payment_repo::mark_refunded(&self.pool, payment.id).await?;
                        refunded = true;
                        counter!("refunds_issued_total").increment(1);
                        tracing::info!(
                            offer_id = %offer.id,
                            reference = %payment.reference,
                            amount = payment.amount_paid,
                            "Offer fee refunded"
                        );
                    }
                    Ok(_) => {
                        counter!("refund_failures_total").increment(1);
                        tracing::warn!(
                            offer_id = %offer.id,
                            reference = %payment.reference,
                            "Gateway did not refund — sweeper will retry"
                        );
                    }
                    Err(e) => {
                        counter!("refund_failures_total").increment(1);
                        tracing::warn!(
                            offer_id = %offer.id,
                            reference = %payment.reference,
                            error = %e,
                            "Refund failed — decline stands, sweeper will retry"
                        );
                    }
                }
            }
        }

        fanout::notify(
            &self.pool,
            NotificationType::OfferDeclined,
            offer.sender_id,
            Some(event.owner_profile_id),
            json!({
                "offer_id": offer.id,
                "bout_id": offer.bout_id,
                "fighter_name": fighter_name,
                "refund_amount": refund_amount,
                "refunded": refunded,
            }),
        )
        .await;

        Ok(offer)
    }

    async fn accept(
        &self,
        offer: Offer,
        bout: Bout,
        event: Event,
    ) -> Result<Offer, WorkflowError> {
        let side = offer.side();

        conflict::validate_acceptance(&self.pool, &bout, side, offer.fighter_id).await?;

        let fighter = profile_repo::get_profile(&self.pool, offer.fighter_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("fighter profile not found".into()))?;
        let payment = payment_repo::get_by_offer(&self.pool, offer.id).await?;

        // Status flip, roster claim and fee bookkeeping commit or roll back
        // together. Losing the slot race rolls everything back and leaves
        // the offer pending.
        let mut tx = self.pool.begin().await?;

        let accepted = offer_repo::resolve_pending(&mut *tx, offer.id, OfferStatus::Accepted)
            .await?
            .ok_or_else(|| {
                WorkflowError::InvalidTransition("offer is already resolved".into())
            })?;

        roster::assign_fighter(&mut *tx, bout.id, side, fighter.id, fighter.card_name()).await?;

        let mut commission = 0i64;
        if let Some(p) = &payment {
            if p.platform_fee > 0 {
                commission = p.platform_fee;
            } else {
                commission = self.commission(p.amount_paid);
                if commission > 0 {
                    payment_repo::set_platform_fee(&mut *tx, p.id, commission).await?;
                }
            }
        }

        tx.commit().await?;

        counter!("offers_accepted_total").increment(1);
        tracing::info!(
            offer_id = %accepted.id,
            bout_id = %bout.id,
            side = %side,
            fighter = fighter.card_name(),
            "Offer accepted"
        );

        // Commission transfer happens after the transition has committed;
        // its failure is logged, never propagated — the roster mutation
        // must not be rolled back over settlement plumbing.
        if let Some(p) = &payment {
            if commission > 0 && !p.is_transferred() {
                match self
                    .gateway
                    .transfer(&p.reference, commission, &self.platform_account)
                    .await
                {
                    Ok(outcome) if outcome.transferred => {
                        if let Err(e) = payment_repo::mark_transferred(&self.pool, p.id).await {
                            tracing::error!(
                                payment_id = %p.id,
                                error = %e,
                                "Transfer succeeded but status update failed"
                            );
                        } else {
                            counter!("commission_transfers_total").increment(1);
                            tracing::info!(
                                reference = %p.reference,
                                commission,
                                "Platform commission transferred"
                            );
                        }
                    }
                    Ok(_) => {
                        counter!("transfer_failures_total").increment(1);
                        tracing::warn!(
                            reference = %p.reference,
                            "Gateway did not transfer commission — sweeper will retry"
                        );
                    }
                    Err(e) => {
                        counter!("transfer_failures_total").increment(1);
                        tracing::warn!(
                            reference = %p.reference,
                            error = %e,
                            "Commission transfer failed — sweeper will retry"
                        );
                    }
                }
            }
        }

        fanout::notify(
            &self.pool,
            NotificationType::BoutAssigned,
            fighter.id,
            Some(event.owner_profile_id),
            json!({
                "bout_id": bout.id,
                "event_id": event.id,
                "side": accepted.side,
            }),
        )
        .await;

        fanout::notify(
            &self.pool,
            NotificationType::OfferAccepted,
            accepted.sender_id,
            Some(event.owner_profile_id),
            json!({
                "offer_id": accepted.id,
                "bout_id": bout.id,
                "side": accepted.side,
                "fighter_name": fighter.card_name(),
            }),
        )
        .await;

        fanout::notify_followers(
            &self.pool,
            event.id,
            Some(event.owner_profile_id),
            NotificationType::EventBoutMatched,
            json!({
                "event_id": event.id,
                "bout_id": bout.id,
                "side": accepted.side,
                "fighter_id": fighter.id,
                "fighter_name": fighter.card_name(),
            }),
        )
        .await;

        Ok(accepted)
    }
}
