use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::IntCounterVec;
use prometheus::IntGaugeVec;
use prometheus::Opts;
use prometheus::Registry;
use tracing::error;

lazy_static! {
    pub static ref EVENTS_ACCEPTED_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("chain_events_accepted", "Notifications taken in by a dispatch loop"),
        &["queue", "kind"]
    )
    .expect("metric can not be created");

    pub static ref EVENTS_DELIVERED_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("chain_events_delivered", "Notifications handed to the consumer stream"),
        &["queue"]
    )
    .expect("metric can not be created");

    pub static ref DROPPED_NOTIFICATIONS_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("chain_dropped_notifications", "Notifications discarded before delivery"),
        &["reason"]
    )
    .expect("metric can not be created");

    pub static ref QUEUE_DEPTH_METRIC: IntGaugeVec = IntGaugeVec::new(
        Opts::new("chain_queue_depth", "Notifications buffered in a dispatch loop"),
        &["queue"]
    )
    .expect("metric can not be created");

    pub static ref LIVENESS_PROBE_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("chain_liveness_probes", "Idle connection probes by outcome"),
        &["outcome"]
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

static REGISTER: Once = Once::new();

fn register_custom_metrics() {
    REGISTER.call_once(|| {
        REGISTRY
            .register(Box::new(EVENTS_ACCEPTED_METRIC.clone()))
            .expect("collector can be registered");
        REGISTRY
            .register(Box::new(EVENTS_DELIVERED_METRIC.clone()))
            .expect("collector can be registered");
        REGISTRY
            .register(Box::new(DROPPED_NOTIFICATIONS_METRIC.clone()))
            .expect("collector can be registered");
        REGISTRY
            .register(Box::new(QUEUE_DEPTH_METRIC.clone()))
            .expect("collector can be registered");
        REGISTRY
            .register(Box::new(LIVENESS_PROBE_METRIC.clone()))
            .expect("collector can be registered");
    });
}

/// Render the client's metrics in the Prometheus text format, for the
/// embedding application to serve.
pub fn gather_metrics() -> String {
    use prometheus::Encoder;

    register_custom_metrics();
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        error!("could not encode chain client metrics: {}", e);
    }
    match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            error!("chain client metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    }
}
