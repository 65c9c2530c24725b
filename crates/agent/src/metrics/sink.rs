use std::sync::Mutex;

use vigil_common::Metric;

pub trait MetricsSink: Send + Sync {
    fn emit(&self, timestamp_ms: i64, name: &str, value: f64, units: &str);
}

/// One JSON object per metric, logged on the `vigil::metrics` target.
#[derive(Debug, Default)]
pub struct LogMetrics;

impl MetricsSink for LogMetrics {
    fn emit(&self, timestamp_ms: i64, name: &str, value: f64, units: &str) {
        let line = serde_json::json!({
            "timestamp": timestamp_ms,
            "name": name,
            "value": value,
            "units": units,
        });
        tracing::info!(target: "vigil::metrics", "{line}");
    }
}

#[derive(Debug, Default)]
pub struct NullMetrics;

impl MetricsSink for NullMetrics {
    fn emit(&self, _timestamp_ms: i64, _name: &str, _value: f64, _units: &str) {}
}

/// Keeps everything emitted; used by tests.
#[derive(Debug, Default)]
pub struct MemoryMetrics {
    emitted: Mutex<Vec<Metric>>,
}

impl MemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted(&self) -> Vec<Metric> {
        self.emitted
            .lock()
            .map(|m| m.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl MetricsSink for MemoryMetrics {
    fn emit(&self, timestamp_ms: i64, name: &str, value: f64, units: &str) {
        let metric = Metric {
            timestamp_ms,
            ..Metric::new(name, value, units)
        };
        match self.emitted.lock() {
            Ok(mut m) => m.push(metric),
            Err(poisoned) => poisoned.into_inner().push(metric),
        }
    }
}
