//! Prometheus metrics describing calls to ONS.
use std::{fmt, time::Duration};

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Counters and histograms for remote calls, exposed through `CollectMetrics`.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    calls: IntCounterVec,
    duration: HistogramVec,
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

impl Metrics {
    /// Create and register the metrics in a fresh registry.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        let calls = IntCounterVec::new(
            Opts::new("ons_remote_calls_total", "Calls made to the ONS API."),
            &["action", "outcome"],
        )?;
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "ons_remote_call_duration_seconds",
                "Duration of calls to the ONS API.",
            ),
            &["action"],
        )?;
        registry.register(Box::new(calls.clone()))?;
        registry.register(Box::new(duration.clone()))?;
        Ok(Self {
            registry,
            calls,
            duration,
        })
    }

    /// Record a finished call.
    pub fn observe(&self, action: &str, elapsed: Duration, ok: bool) {
        let outcome = if ok { "success" } else { "error" };
        self.calls.with_label_values(&[action, outcome]).inc();
        self.duration
            .with_label_values(&[action])
            .observe(elapsed.as_secs_f64());
    }

    /// Encode all metrics in the Prometheus text exposition format.
    pub fn encode(&self) -> prometheus::Result<Vec<u8>> {
        let mut buffer = vec![];
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encode_observed_calls() {
        let metrics = Metrics::new().unwrap();
        metrics.observe("OnsConsumerAccumulate", Duration::from_millis(20), true);
        metrics.observe("OnsConsumerAccumulate", Duration::from_millis(20), false);
        metrics.observe("OnsConsumerAccumulate", Duration::from_millis(20), false);
        let text = String::from_utf8(metrics.encode().unwrap()).unwrap();
        assert!(text.contains(
            r#"ons_remote_calls_total{action="OnsConsumerAccumulate",outcome="error"} 2"#
        ));
        assert!(text.contains(
            r#"ons_remote_calls_total{action="OnsConsumerAccumulate",outcome="success"} 1"#
        ));
        assert!(text
            .contains(r#"ons_remote_call_duration_seconds_count{action="OnsConsumerAccumulate"} 3"#));
    }
}
