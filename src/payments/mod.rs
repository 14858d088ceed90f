pub mod http_gateway;
pub mod webhook;

pub use http_gateway::HttpGateway;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Side;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The call did not complete within the bound. The charge may or may
    /// not have gone through; callers must not assume either.
    #[error("gateway request timed out after {0}s")]
    Timeout(u64),

    #[error("gateway returned HTTP {0}")]
    Http(u16),

    #[error("gateway transport error: {0}")]
    Transport(String),

    #[error("gateway response malformed: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone)]
pub struct Checkout {
    pub reference: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy)]
pub struct RefundOutcome {
    pub refunded: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TransferOutcome {
    pub transferred: bool,
}

/// External payment collaborator. All three calls are idempotent given the
/// same reference, which is what makes retries (in-line and from the
/// settlement sweeper) safe.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout(
        &self,
        reference: &str,
        bout_id: Uuid,
        fighter_id: Uuid,
        side: Side,
        amount: i64,
    ) -> Result<Checkout, GatewayError>;

    async fn refund(&self, reference: &str) -> Result<RefundOutcome, GatewayError>;

    async fn transfer(
        &self,
        reference: &str,
        amount: i64,
        destination: &str,
    ) -> Result<TransferOutcome, GatewayError>;
}

/// Gateway used when no real gateway is configured: logs the call and
/// reports success. Mirrors running the order path without credentials.
pub struct DryRunGateway;

#[async_trait]
impl PaymentGateway for DryRunGateway {
    async fn create_checkout(
        &self,
        reference: &str,
        bout_id: Uuid,
        fighter_id: Uuid,
        side: Side,
        amount: i64,
    ) -> Result<Checkout, GatewayError> {
        tracing::info!(
            reference,
            bout_id = %bout_id,
            fighter_id = %fighter_id,
            side = %side,
            amount,
            "[DRY-RUN] Would create checkout"
        );
        Ok(Checkout {
            reference: reference.to_string(),
            url: format!("https://checkout.invalid/session/{reference}"),
        })
    }

    async fn refund(&self, reference: &str) -> Result<RefundOutcome, GatewayError> {
        tracing::info!(reference, "[DRY-RUN] Would refund payment");
        Ok(RefundOutcome { refunded: true })
    }

    async fn transfer(
        &self,
        reference: &str,
        amount: i64,
        destination: &str,
    ) -> Result<TransferOutcome, GatewayError> {
        tracing::info!(reference, amount, destination, "[DRY-RUN] Would transfer commission");
        Ok(TransferOutcome { transferred: true })
    }
}
