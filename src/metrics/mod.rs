//! Prometheus metrics for the scheduler and execution pipeline.

use prometheus::{Encoder, Gauge, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub scheduler_ticks_total: IntCounter,
    pub executions_total: IntCounter,
    pub execution_failures_total: IntCounter,
    pub execution_skips_total: IntCounter,
    pub signals_generated_total: IntCounter,
    pub strategies_active: Gauge,
    pub positions_open: Gauge,
    pub execution_duration_seconds: Histogram,
    pub http_requests_total: IntCounter,
    pub http_requests_in_flight: Gauge,
    pub http_request_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let scheduler_ticks_total =
            IntCounter::new("cadence_scheduler_ticks_total", "Scheduler polling ticks")?;
        let executions_total =
            IntCounter::new("cadence_executions_total", "Completed strategy executions")?;
        let execution_failures_total = IntCounter::new(
            "cadence_execution_failures_total",
            "Failed strategy executions",
        )?;
        let execution_skips_total = IntCounter::new(
            "cadence_execution_skips_total",
            "Due checks skipped by conditions",
        )?;
        let signals_generated_total =
            IntCounter::new("cadence_signals_generated_total", "Signals synthesized")?;
        let strategies_active = Gauge::new("cadence_strategies_active", "Active strategies")?;
        let positions_open = Gauge::new("cadence_positions_open", "Open positions")?;
        let execution_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "cadence_execution_duration_seconds",
            "Wall time of a single strategy execution",
        ))?;
        let http_requests_total =
            IntCounter::new("cadence_http_requests_total", "HTTP requests served")?;
        let http_requests_in_flight =
            Gauge::new("cadence_http_requests_in_flight", "HTTP requests in flight")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "cadence_http_request_duration_seconds",
            "HTTP request latency",
        ))?;

        registry.register(Box::new(scheduler_ticks_total.clone()))?;
        registry.register(Box::new(executions_total.clone()))?;
        registry.register(Box::new(execution_failures_total.clone()))?;
        registry.register(Box::new(execution_skips_total.clone()))?;
        registry.register(Box::new(signals_generated_total.clone()))?;
        registry.register(Box::new(strategies_active.clone()))?;
        registry.register(Box::new(positions_open.clone()))?;
        registry.register(Box::new(execution_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            scheduler_ticks_total,
            executions_total,
            execution_failures_total,
            execution_skips_total,
            signals_generated_total,
            strategies_active,
            positions_open,
            execution_duration_seconds,
            http_requests_total,
            http_requests_in_flight,
            http_request_duration_seconds,
        })
    }

    /// Export all metrics in the Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
