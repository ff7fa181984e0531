// Metrics module
// Prometheus counters exposed at /metrics

use anyhow::{Context, Result};
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub messages_total: IntCounter,
    pub crisis_alerts_total: IntCounterVec,
    pub provider_failures_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let messages_total = IntCounter::with_opts(Opts::new(
            "solace_messages_total",
            "Total chat messages appended",
        ))
        .context("Failed to create messages counter")?;

        let crisis_alerts_total = IntCounterVec::new(
            Opts::new("solace_crisis_alerts_total", "Crisis alerts persisted"),
            &["level"],
        )
        .context("Failed to create alerts counter")?;

        let provider_failures_total = IntCounterVec::new(
            Opts::new(
                "solace_provider_failures_total",
                "Upstream provider failures",
            ),
            &["provider"],
        )
        .context("Failed to create provider failure counter")?;

        registry
            .register(Box::new(messages_total.clone()))
            .context("Failed to register messages counter")?;
        registry
            .register(Box::new(crisis_alerts_total.clone()))
            .context("Failed to register alerts counter")?;
        registry
            .register(Box::new(provider_failures_total.clone()))
            .context("Failed to register provider failure counter")?;

        Ok(Self {
            registry,
            messages_total,
            crisis_alerts_total,
            provider_failures_total,
        })
    }

    /// Render the registry in Prometheus text exposition format
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output was not UTF-8")
    }
}
