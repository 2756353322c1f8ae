use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

pub const OUTCOME_OK: &str = "ok";
pub const OUTCOME_EMPTY: &str = "empty";
pub const OUTCOME_ERROR: &str = "error";
pub const OUTCOME_UNSUPPORTED: &str = "unsupported";

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Issuer metrics
    pub issuer_requests: IntCounterVec,
    pub issuer_failures: IntCounterVec,
    pub issuer_duration: HistogramVec,

    // Cache metrics
    pub cached_tokens: IntGaugeVec,
    pub cache_refreshes: IntCounterVec,

    // Dispatch metrics
    pub like_calls: IntCounterVec,
    pub dispatch_duration: HistogramVec,

    pub up: IntGauge,
}

impl Metrics {
    // metric names and label sets are static, construction can only fail on a programming error
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("likeagent".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Issuer
            issuer_requests: IntCounterVec::new(Opts::new("issuer_requests_total", "Token issuer calls by region"), &["region"]).unwrap(),
            issuer_failures: IntCounterVec::new(Opts::new("issuer_failures_total", "Token issuer failures by reason"), &["region", "reason"]).unwrap(),
            issuer_duration: HistogramVec::new(HistogramOpts::new("issuer_duration_seconds", "Token issuer call duration seconds").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["region"]).unwrap(),

            // Cache
            cached_tokens: IntGaugeVec::new(Opts::new("cached_tokens_total", "Cached tokens per region"), &["region"]).unwrap(),
            cache_refreshes: IntCounterVec::new(Opts::new("cache_refreshes_total", "Token cache refresh cycles by outcome"), &["region", "outcome"]).unwrap(),

            // Dispatch
            like_calls: IntCounterVec::new(Opts::new("like_calls_total", "Per-token like calls by outcome"), &["region", "outcome"]).unwrap(),
            dispatch_duration: HistogramVec::new(HistogramOpts::new("dispatch_duration_seconds", "Fan-out burst duration seconds").buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]), &["region"]).unwrap(),

            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.issuer_requests.clone())).unwrap();
        reg.register(Box::new(metrics.issuer_failures.clone())).unwrap();
        reg.register(Box::new(metrics.issuer_duration.clone())).unwrap();
        reg.register(Box::new(metrics.cached_tokens.clone())).unwrap();
        reg.register(Box::new(metrics.cache_refreshes.clone())).unwrap();
        reg.register(Box::new(metrics.like_calls.clone())).unwrap();
        reg.register(Box::new(metrics.dispatch_duration.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
