use sqlx::PgExecutor;
use uuid::Uuid;

use crate::db::bout_repo;
use crate::models::Side;

use super::WorkflowError;

/// Apply an accepted offer's fighter assignment onto the bout's corner
/// slot. The underlying update is gated on the slot being empty, which is
/// what stops two accepts for the same side racing past each other; a lost
/// race surfaces as a conflict and the caller's transaction rolls back.
pub async fn assign_fighter<'e, E>(
    ex: E,
    bout_id: Uuid,
    side: Side,
    fighter_id: Uuid,
    display_name: &str,
) -> Result<(), WorkflowError>
where
    E: PgExecutor<'e>,
{
    let claimed = bout_repo::assign_fighter(ex, bout_id, side, fighter_id, display_name).await?;

    if !claimed {
        return Err(WorkflowError::Conflict(format!(
            "{side} corner is already filled"
        )));
    }

    tracing::info!(
        bout_id = %bout_id,
        side = %side,
        fighter_id = %fighter_id,
        "Fighter assigned to corner"
    );

    Ok(())
}
