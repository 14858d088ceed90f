use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // Pre-register counters so they appear even before the first increment.
    counter!("offers_created_total").absolute(0);
    counter!("offers_accepted_total").absolute(0);
    counter!("offers_declined_total").absolute(0);
    counter!("refunds_issued_total").absolute(0);
    counter!("refund_failures_total").absolute(0);
    counter!("commission_transfers_total").absolute(0);
    counter!("transfer_failures_total").absolute(0);
    counter!("notifications_emitted_total").absolute(0);

    // Histogram is lazily created on first record; force creation.
    histogram!("offer_resolve_seconds").record(0.0);

    handle
}
