use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{timeout_at, Instant};
use vigil_common::fault::check_name_of;

use crate::alerter::Alerter;
use crate::check::{self, Check};
use crate::config::{load_checks, AgentSection, Config, LoadError};
use crate::metrics::MetricsSink;
use crate::reconcile::{CheckResult, CriticalSet, Reconciler};
use crate::registry;
use crate::scheduler::TickHandler;
use crate::store::{Store, StoreError};

#[derive(Debug)]
pub enum AgentError {
    Store(StoreError),
    Config(LoadError),
}

impl std::fmt::Display for AgentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(e) => write!(f, "store: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for AgentError {}

impl From<StoreError> for AgentError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<LoadError> for AgentError {
    fn from(e: LoadError) -> Self {
        Self::Config(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub name: String,
    pub base_interval: Duration,
    /// Deadline for all checks of one tick.
    pub timeout: Duration,
    /// Deadline for all alert calls of one tick.
    pub alert_timeout: Duration,
}

impl AgentSettings {
    pub fn new(name: impl Into<String>, base_interval: Duration) -> Self {
        Self {
            name: name.into(),
            base_interval,
            timeout: base_interval.mul_f64(0.7),
            alert_timeout: base_interval.mul_f64(0.2),
        }
    }

    pub fn from_config(section: &AgentSection) -> Self {
        Self {
            name: section.resolved_name(),
            base_interval: section.base_interval(),
            timeout: section.timeout(),
            alert_timeout: section.alert_timeout(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickSummary {
    pub tick: u64,
    pub checks_run: usize,
    pub timed_out: usize,
    pub faults: usize,
    pub critical: usize,
    pub alerts_total: usize,
    pub alerts_failed: usize,
}

/// Runs due checks each tick and reconciles their faults with the alerter
/// and the store.
pub struct Agent {
    settings: AgentSettings,
    checks: Vec<Check>,
    store: Arc<dyn Store>,
    metrics: Arc<dyn MetricsSink>,
    reconciler: Reconciler,
    critical: CriticalSet,
}

impl Agent {
    /// Seeds the critical set from whatever the store last recorded for
    /// this agent, so alerts raised before a restart are not sent again.
    pub async fn new(
        settings: AgentSettings,
        checks: Vec<Check>,
        store: Arc<dyn Store>,
        alerter: Arc<dyn Alerter>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Result<Self, AgentError> {
        let previous = store.get_faults(&settings.name).await?;
        // Only configured checks can ever resolve what they raised.
        let critical = CriticalSet::from_faults(previous.iter().filter(|f| {
            let check = check_name_of(&f.name);
            checks.iter().any(|c| c.spec.name == check)
        }));
        tracing::info!(
            agent = %settings.name,
            checks = checks.len(),
            alerter = alerter.name(),
            known_critical = critical.len(),
            "agent configured"
        );

        let reconciler = Reconciler::new(
            settings.name.clone(),
            store.clone(),
            alerter,
            settings.alert_timeout,
        );
        Ok(Self {
            settings,
            checks,
            store,
            metrics,
            reconciler,
            critical,
        })
    }

    pub async fn from_config(config: &Config) -> Result<Self, AgentError> {
        let settings = AgentSettings::from_config(&config.agent);
        let checks = load_checks(Path::new(&config.agent.directory), &settings.name)?;
        Self::new(
            settings,
            checks,
            registry::build_store(&config.database),
            registry::build_alerter(&config.alerter),
            registry::build_metrics(&config.metrics),
        )
        .await
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn critical(&self) -> &CriticalSet {
        &self.critical
    }

    pub async fn perform(&mut self, tick: u64) -> Result<TickSummary, AgentError> {
        let deadline = Instant::now() + self.settings.timeout;

        let running: Vec<_> = self
            .checks
            .iter()
            .enumerate()
            .filter(|(_, check)| check.should_run(tick))
            .map(|(index, check)| {
                let spec = check.spec.clone();
                let mut state = check.state.clone();
                let handle = tokio::spawn(async move {
                    let output = check::perform(&spec, &mut state).await;
                    (output, state)
                });
                (index, handle)
            })
            .collect();

        let mut summary = TickSummary {
            tick,
            checks_run: running.len(),
            ..Default::default()
        };

        let mut results = Vec::with_capacity(running.len());
        for (index, mut handle) in running {
            let check = &mut self.checks[index];
            let output = match timeout_at(deadline, &mut handle).await {
                Ok(Ok((output, state))) => {
                    check.state = state;
                    output
                }
                Ok(Err(e)) => check::crashed(&check.spec, &mut check.state, &e),
                Err(_) => {
                    handle.abort();
                    summary.timed_out += 1;
                    check::timed_out(&check.spec, &mut check.state)
                }
            };

            for metric in &output.metrics {
                self.metrics.emit(
                    metric.timestamp_ms,
                    &format!("{}#{}", check.name(), metric.name),
                    metric.value,
                    &metric.units,
                );
            }
            results.push(CheckResult {
                check: check.name().to_string(),
                faults: output.faults,
            });
        }

        let report = self.reconciler.reconcile(&self.critical, results).await?;
        // Alert state moves first: a failed write must not re-trigger next tick.
        self.critical = report.critical;

        summary.faults = report.faults.len();
        summary.critical = self.critical.len();
        summary.alerts_total = report.alerts_total;
        summary.alerts_failed = report.alerts_failed;

        self.store.set_faults(&self.settings.name, report.faults).await?;
        Ok(summary)
    }
}

#[async_trait]
impl TickHandler for Agent {
    async fn on_tick(&mut self, tick: u64) -> Result<(), AgentError> {
        let summary = self.perform(tick).await?;
        tracing::debug!(
            tick,
            checks_run = summary.checks_run,
            timed_out = summary.timed_out,
            faults = summary.faults,
            critical = summary.critical,
            alerts = summary.alerts_total,
            alerts_failed = summary.alerts_failed,
            "tick complete"
        );
        Ok(())
    }

    async fn on_shutdown(&mut self) {
        match self.store.remove_agent(&self.settings.name).await {
            Ok(()) => tracing::info!(agent = %self.settings.name, "agent deregistered"),
            Err(e) => tracing::error!(agent = %self.settings.name, error = %e, "deregistration failed"),
        }
    }
}
