use sqlx::PgPool;
use uuid::Uuid;

use crate::db::offer_repo;
use crate::models::Side;

use super::WorkflowError;

const DUPLICATE_MSG: &str = "an offer for this fighter and corner already exists";

/// Friendly pre-check for a duplicate (bout, side, fighter) offer.
///
/// This check alone is racy: two senders can both pass it before either
/// insert lands. The partial unique index on offers is the authoritative
/// guard; [`map_offer_insert_err`] translates its violation into the same
/// conflict this function produces.
pub async fn check_no_existing_offer(
    pool: &PgPool,
    bout_id: Uuid,
    side: Side,
    fighter_id: Uuid,
) -> Result<(), WorkflowError> {
    if offer_repo::find_active_offer(pool, bout_id, side, fighter_id)
        .await?
        .is_some()
    {
        return Err(WorkflowError::Conflict(DUPLICATE_MSG.into()));
    }

    Ok(())
}

/// Translate a failed offer insert: a unique violation becomes the same
/// duplicate-offer conflict as the pre-check, anything else is internal.
pub fn map_offer_insert_err(e: sqlx::Error) -> WorkflowError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return WorkflowError::Conflict(DUPLICATE_MSG.into());
        }
    }
    WorkflowError::Internal(e.into())
}
