use rust_decimal::Decimal;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    /// Commission rate applied to paid offer fees on acceptance.
    pub platform_fee_rate: Decimal,
    /// Destination account for commission transfers.
    pub platform_account: String,

    // Payment gateway (optional — without it the dry-run gateway is used)
    pub gateway_base_url: Option<String>,
    pub gateway_api_key: Option<String>,
    pub gateway_timeout_secs: u64,
    pub gateway_retries: u32,

    /// When set, paid offers are persisted only after the gateway webhook
    /// confirms the charge. Unset selects the legacy synchronous path.
    pub payment_webhook_secret: Option<String>,

    // Settlement sweeper
    pub sweep_enabled: bool,
    pub sweep_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            platform_fee_rate: env::var("PLATFORM_FEE_RATE")
                .unwrap_or_else(|_| "0.05".into())
                .parse()
                .unwrap_or(Decimal::new(5, 2)),
            platform_account: env::var("PLATFORM_ACCOUNT")
                .unwrap_or_else(|_| "platform".into()),

            gateway_base_url: env::var("GATEWAY_BASE_URL").ok(),
            gateway_api_key: env::var("GATEWAY_API_KEY").ok(),
            gateway_timeout_secs: env::var("GATEWAY_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),
            gateway_retries: env::var("GATEWAY_RETRIES")
                .unwrap_or_else(|_| "2".into())
                .parse()
                .unwrap_or(2),

            payment_webhook_secret: env::var("PAYMENT_WEBHOOK_SECRET").ok(),

            sweep_enabled: env::var("SETTLEMENT_SWEEP_ENABLED")
                .unwrap_or_else(|_| "true".into())
                .parse()
                .unwrap_or(true),
            sweep_interval_secs: env::var("SETTLEMENT_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".into())
                .parse()
                .unwrap_or(60),
        })
    }

    /// Returns true if a real payment gateway is configured.
    pub fn has_gateway(&self) -> bool {
        self.gateway_base_url.is_some() && self.gateway_api_key.is_some()
    }
}
