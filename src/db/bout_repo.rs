use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::{Bout, Side};

pub async fn get_bout(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<Bout>> {
    let bout = sqlx::query_as::<_, Bout>("SELECT * FROM bouts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(bout)
}

/// Claim a corner slot for a fighter. The update is conditional on the slot
/// being empty, so two accepts racing for the same side cannot both win.
/// Returns false when the slot was already taken.
pub async fn assign_fighter<'e, E>(
    ex: E,
    bout_id: Uuid,
    side: Side,
    fighter_id: Uuid,
    display_name: &str,
) -> anyhow::Result<bool>
where
    E: PgExecutor<'e>,
{
    let sql = match side {
        Side::Red => {
            r#"
            UPDATE bouts
            SET red_fighter_id = $2,
                red_name = $3,
                red_seeking_opponent = FALSE,
                updated_at = NOW()
            WHERE id = $1 AND red_fighter_id IS NULL
            "#
        }
        Side::Blue => {
            r#"
            UPDATE bouts
            SET blue_fighter_id = $2,
                blue_name = $3,
                blue_seeking_opponent = FALSE,
                updated_at = NOW()
            WHERE id = $1 AND blue_fighter_id IS NULL
            "#
        }
    };

    let result = sqlx::query(sql)
        .bind(bout_id)
        .bind(fighter_id)
        .bind(display_name)
        .execute(ex)
        .await?;

    Ok(result.rows_affected() > 0)
}
