use std::sync::Arc;

use anyhow::Result;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use tokio::sync::OnceCell;
use tracing::{info, warn};

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> Result<&'static Arc<Metrics>> {
    METRICS_INSTANCE
        .get_or_try_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

/// Runs `record` against the registry; a registry that failed to build only costs a warning.
pub async fn with_metrics(record: impl FnOnce(&Metrics)) {
    match get_metrics().await {
        Ok(metrics) => record(metrics),
        Err(e) => warn!("metrics unavailable: {}", e),
    }
}

/// Prometheus text exposition of every registered metric
pub async fn render_metrics() -> Result<String> {
    let metrics = get_metrics().await?;
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&metrics.registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Authentication
    pub auth_requests: IntCounterVec,
    pub auth_failures: IntCounterVec,

    // Map lookup
    pub lookup_requests: IntCounter,
    pub lookup_failures: IntCounter,
    pub maps_found: IntCounter,

    // Download
    pub download_requests: IntCounter,
    pub download_failures: IntCounter,

    pub request_duration: HistogramVec,
}

impl Metrics {
    fn new() -> Result<Arc<Self>> {
        let registry = Registry::new_custom(Some("nadeomaps".into()), None)?;

        let metrics = Arc::new(Self {
            auth_requests: IntCounterVec::new(Opts::new("auth_requests_total", "Authentication requests by mode"), &["mode"])?,
            auth_failures: IntCounterVec::new(Opts::new("auth_failures_total", "Authentication failures by mode"), &["mode"])?,

            lookup_requests: IntCounter::new("lookup_requests_total", "Map info lookups")?,
            lookup_failures: IntCounter::new("lookup_failures_total", "Map info lookups that returned no data")?,
            maps_found: IntCounter::new("maps_found_total", "Map info records returned by lookups")?,

            download_requests: IntCounter::new("download_requests_total", "Map file downloads")?,
            download_failures: IntCounter::new("download_failures_total", "Map file downloads with a non-success status")?,

            request_duration: HistogramVec::new(
                HistogramOpts::new("request_duration_seconds", "Remote call duration seconds")
                    .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
                &["op"],
            )?,

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.auth_requests.clone()))?;
        reg.register(Box::new(metrics.auth_failures.clone()))?;
        reg.register(Box::new(metrics.lookup_requests.clone()))?;
        reg.register(Box::new(metrics.lookup_failures.clone()))?;
        reg.register(Box::new(metrics.maps_found.clone()))?;
        reg.register(Box::new(metrics.download_requests.clone()))?;
        reg.register(Box::new(metrics.download_failures.clone()))?;
        reg.register(Box::new(metrics.request_duration.clone()))?;

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rendered_output_uses_namespace() {
        with_metrics(|m| m.auth_requests.with_label_values(&["initial"]).inc()).await;
        let text = render_metrics().await.unwrap();
        assert!(text.contains("nadeomaps_auth_requests_total"));
    }
}
