use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Profile;

pub async fn get_profile(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(profile)
}
