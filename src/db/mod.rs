pub mod bout_repo;
pub mod checkout_repo;
pub mod event_repo;
pub mod notification_repo;
pub mod offer_repo;
pub mod payment_repo;
pub mod profile_repo;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub async fn init_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    // Verify connectivity
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}
