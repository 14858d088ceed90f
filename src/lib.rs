pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod payments;
pub mod services;
pub mod workflow;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::workflow::OfferLedger;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub ledger: Arc<OfferLedger>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
