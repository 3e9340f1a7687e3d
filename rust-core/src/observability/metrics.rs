use crate::error::Result;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Proceeded,
    Clarified,
    Completed,
    Failed,
}

impl RequestOutcome {
    fn label(&self) -> &'static str {
        match self {
            RequestOutcome::Proceeded => "proceeded",
            RequestOutcome::Clarified => "clarified",
            RequestOutcome::Completed => "completed",
            RequestOutcome::Failed => "failed",
        }
    }
}

/// Per-router counters and histograms on a private registry.
#[derive(Clone)]
pub struct RouterMetrics {
    registry: Arc<Registry>,
    requests: IntCounterVec,
    collaborator_failures: IntCounter,
    request_duration: Histogram,
    match_confidence: Histogram,
}

impl RouterMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("las_router_requests_total", "Routing requests by action and outcome")
                .const_label("component", "router"),
            &["action", "outcome"],
        )?;

        let collaborator_failures = IntCounter::with_opts(Opts::new(
            "las_router_collaborator_failures_total",
            "Failed or timed out collaborator calls",
        ))?;

        let request_duration = Histogram::with_opts(
            HistogramOpts::new("las_router_request_duration_seconds", "Request duration in seconds")
                .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 30.0, 300.0]),
        )?;

        let match_confidence = Histogram::with_opts(
            HistogramOpts::new("las_router_match_confidence", "Confidence of the selected match")
                .buckets(vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]),
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(collaborator_failures.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(match_confidence.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            requests,
            collaborator_failures,
            request_duration,
            match_confidence,
        })
    }

    pub fn record_request(&self, action: &str, outcome: RequestOutcome, duration: Duration) {
        self.requests.with_label_values(&[action, outcome.label()]).inc();
        self.request_duration.observe(duration.as_secs_f64());
    }

    pub fn record_confidence(&self, confidence: f64) {
        self.match_confidence.observe(confidence);
    }

    pub fn record_collaborator_failure(&self) {
        self.collaborator_failures.inc();
    }

    pub fn requests(&self, action: &str, outcome: RequestOutcome) -> u64 {
        self.requests.with_label_values(&[action, outcome.label()]).get()
    }

    pub fn collaborator_failures(&self) -> u64 {
        self.collaborator_failures.get()
    }

    /// Prometheus text exposition of every metric.
    pub fn export(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
