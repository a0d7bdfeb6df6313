//! Metrics for the delta xDS server.
//!
//! Counters and gauges are emitted through the `metrics` facade; wiring an
//! exporter is the embedder's concern.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// Metrics for the delta xDS server.
#[derive(Debug, Clone, Default)]
pub struct XdsMetrics {
    inner: Arc<XdsMetricsInner>,
}

#[derive(Debug, Default)]
struct XdsMetricsInner {
    active_streams: AtomicU64,
}

impl XdsMetrics {
    /// Create a new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stream opened.
    pub fn stream_opened(&self) {
        let count = self.inner.active_streams.fetch_add(1, Ordering::Relaxed) + 1;
        counter!("xds_streams_opened_total").increment(1);
        gauge!("xds_active_streams").set(count as f64);
    }

    /// Record a stream closed.
    pub fn stream_closed(&self, duration: Duration) {
        let count = self
            .inner
            .active_streams
            .fetch_sub(1, Ordering::Relaxed)
            .saturating_sub(1);
        counter!("xds_streams_closed_total").increment(1);
        gauge!("xds_active_streams").set(count as f64);
        histogram!("xds_stream_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a stream disconnected to rebalance load.
    pub fn stream_drained(&self) {
        counter!("xds_streams_drained_total").increment(1);
    }

    /// Record an ACK from a proxy.
    pub fn record_ack(&self, type_url: &str) {
        counter!("xds_acks_total", "type_url" => type_url.to_string()).increment(1);
    }

    /// Record a NACK from a proxy.
    pub fn record_nack(&self, type_url: &str) {
        counter!("xds_nacks_total", "type_url" => type_url.to_string()).increment(1);
    }

    /// Record a delta response sent.
    pub fn record_response(&self, type_url: &str) {
        counter!("xds_delta_responses_total", "type_url" => type_url.to_string()).increment(1);
    }

    /// Current number of active streams as this instance has observed them.
    pub fn active_streams(&self) -> u64 {
        self.inner.active_streams.load(Ordering::Relaxed)
    }
}
