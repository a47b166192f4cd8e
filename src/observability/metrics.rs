use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Arc::new(Metrics::build().expect("static metric definitions are valid"))
    }).await
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Request metrics
    pub requests: IntCounterVec,
    pub request_failures: IntCounterVec,
    pub request_duration: HistogramVec,

    // Token metrics
    pub token_refreshes: IntCounterVec,
    pub token_validation_failures: IntCounter,

    // Config
    pub config_validation_errors: IntCounter,
}

impl Metrics {
    fn build() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("bearerclient".into()), None)?;

        let metrics = Self {
            requests: IntCounterVec::new(Opts::new("requests_total", "Dispatched requests by method and response status"), &["method", "status"])?,
            request_failures: IntCounterVec::new(Opts::new("request_failures_total", "Request failures by reason"), &["reason"])?,
            request_duration: HistogramVec::new(HistogramOpts::new("request_duration_seconds", "Request round trip seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["method"])?,

            token_refreshes: IntCounterVec::new(Opts::new("token_refresh_total", "Token refresh calls by outcome"), &["outcome"])?,
            token_validation_failures: IntCounter::new("token_validation_failures_total", "Stored tokens that failed decoding or were expired")?,

            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors while loading config")?,

            registry,
        };

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.requests.clone()))?;
        reg.register(Box::new(metrics.request_failures.clone()))?;
        reg.register(Box::new(metrics.request_duration.clone()))?;
        reg.register(Box::new(metrics.token_refreshes.clone()))?;
        reg.register(Box::new(metrics.token_validation_failures.clone()))?;
        reg.register(Box::new(metrics.config_validation_errors.clone()))?;

        Ok(metrics)
    }

    /// Text exposition of everything gathered so far.
    pub fn encode_text(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
