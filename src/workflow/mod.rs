pub mod conflict;
pub mod fanout;
pub mod ledger;
pub mod roster;
pub mod uniqueness;

pub use ledger::{CreateOfferOutcome, OfferLedger};

use thiserror::Error;

use crate::payments::GatewayError;

/// Error taxonomy of the bout-offer workflow. Everything except `Internal`
/// carries a user-facing message and is surfaced synchronously; `Payment`
/// during creation aborts the operation, while refund/transfer failures
/// after a decided transition are logged instead (status is truth, money
/// settlement is eventually consistent).
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("payment gateway: {0}")]
    Payment(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for WorkflowError {
    fn from(e: sqlx::Error) -> Self {
        WorkflowError::Internal(e.into())
    }
}

impl From<GatewayError> for WorkflowError {
    fn from(e: GatewayError) -> Self {
        WorkflowError::Payment(e.to_string())
    }
}
