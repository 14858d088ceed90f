use std::sync::Arc;

use fightcard::api::router::create_router;
use fightcard::config::AppConfig;
use fightcard::payments::{DryRunGateway, HttpGateway, PaymentGateway};
use fightcard::services::settlement_sweeper::run_settlement_sweeper;
use fightcard::workflow::OfferLedger;
use fightcard::{db, metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Connecting to database...");
    let pool = db::init_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database connected");

    let metrics_handle = metrics::init_metrics();

    // --- Payment gateway ---
    let gateway: Arc<dyn PaymentGateway> = if config.has_gateway() {
        let base_url = config.gateway_base_url.clone().unwrap_or_default();
        let api_key = config.gateway_api_key.clone().unwrap_or_default();
        tracing::info!(base_url = %base_url, "Payment gateway configured");
        Arc::new(HttpGateway::new(
            base_url,
            api_key,
            config.gateway_timeout_secs,
            config.gateway_retries,
        ))
    } else {
        tracing::warn!("No payment gateway configured — running in dry-run payment mode");
        Arc::new(DryRunGateway)
    };

    if config.payment_webhook_secret.is_some() {
        tracing::info!("Webhook payment confirmation enabled");
    } else {
        tracing::info!("Webhook secret unset — paid offers persist synchronously (legacy mode)");
    }

    let ledger = Arc::new(OfferLedger::new(pool.clone(), gateway.clone(), &config));

    // --- Settlement sweeper: retries unsettled refunds and transfers ---
    if config.sweep_enabled {
        let sweeper_pool = pool.clone();
        let sweeper_gateway = gateway.clone();
        let platform_account = config.platform_account.clone();
        let interval = config.sweep_interval_secs;
        tokio::spawn(async move {
            run_settlement_sweeper(sweeper_pool, sweeper_gateway, platform_account, interval)
                .await;
        });
    } else {
        tracing::info!("Settlement sweeper disabled (SETTLEMENT_SWEEP_ENABLED=false)");
    }

    let state = AppState {
        db: pool,
        config,
        ledger,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
