//! Maps the `kind` of each configured collaborator to its implementation.

use std::sync::Arc;

use crate::alerter::{Alerter, LogAlerter, PagerDutyAlerter, SlackAlerter};
use crate::config::{AlerterConfig, DatabaseConfig, MetricsConfig};
use crate::metrics::{LogMetrics, MetricsSink, NullMetrics};
use crate::store::{FileStore, MemoryStore, Store};

pub fn build_store(config: &DatabaseConfig) -> Arc<dyn Store> {
    match config {
        DatabaseConfig::Memory { faults } => Arc::new(MemoryStore::with_faults(faults.clone())),
        DatabaseConfig::File { path } => Arc::new(FileStore::new(path)),
    }
}

pub fn build_alerter(config: &AlerterConfig) -> Arc<dyn Alerter> {
    match config {
        AlerterConfig::Log => Arc::new(LogAlerter),
        AlerterConfig::Slack {
            webhook_url,
            target,
        } => Arc::new(SlackAlerter::new(webhook_url.clone(), target.clone())),
        AlerterConfig::PagerDuty { token, service } => {
            Arc::new(PagerDutyAlerter::new(token.clone(), service.clone()))
        }
    }
}

pub fn build_metrics(config: &MetricsConfig) -> Arc<dyn MetricsSink> {
    match config {
        MetricsConfig::Log => Arc::new(LogMetrics),
        MetricsConfig::Disabled => Arc::new(NullMetrics),
    }
}
