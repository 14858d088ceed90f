use sqlx::PgPool;
use uuid::Uuid;

use crate::db::profile_repo;
use crate::models::{Bout, Side};

use super::WorkflowError;

/// Validate that accepting an offer would not produce an invalid matchup:
/// a fighter facing themselves, or two fighters from the same gym.
///
/// When either affiliation cannot be determined the guard allows the
/// acceptance (fails open). Product has confirmed this leniency is to be
/// kept as-is: incomplete gym data must not block a match.
pub async fn validate_acceptance(
    pool: &PgPool,
    bout: &Bout,
    side: Side,
    fighter_id: Uuid,
) -> Result<(), WorkflowError> {
    let opponent_id = match bout.fighter_on(side.opposite()) {
        Some(id) => id,
        // Empty opposite corner: nothing to conflict with.
        None => return Ok(()),
    };

    if opponent_id == fighter_id {
        return Err(WorkflowError::Conflict(
            "fighter cannot face themselves".into(),
        ));
    }

    let candidate = profile_repo::get_profile(pool, fighter_id).await?;
    let opponent = profile_repo::get_profile(pool, opponent_id).await?;

    let candidate_gym = candidate.as_ref().and_then(|p| p.gym_username.as_deref());
    let opponent_gym = opponent.as_ref().and_then(|p| p.gym_username.as_deref());

    if same_gym(candidate_gym, opponent_gym) {
        return Err(WorkflowError::Conflict("same-gym matchup blocked".into()));
    }

    Ok(())
}

/// Gym affiliations match when both are present, non-empty after trimming,
/// and equal case-insensitively. Any missing side compares as no match.
fn same_gym(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            let a = a.trim();
            let b = b.trim();
            !a.is_empty() && !b.is_empty() && a.to_lowercase() == b.to_lowercase()
        }
        _ => false,
    }
}
