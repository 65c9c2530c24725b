use std::sync::Arc;

use serde::Deserialize;

use crate::scheduler::should_run;
use crate::threshold::{ThresholdError, Thresholds};

/// A check as written in a check file section.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CheckDefinition {
    pub command: String,
    #[serde(default = "one")]
    pub interval: u64,
    #[serde(default = "default_retry")]
    pub retry: u32,
    #[serde(default = "one")]
    pub retry_interval: u64,
    #[serde(default)]
    pub thresholds: Option<String>,
    #[serde(default)]
    pub nagios_performance: bool,
}

fn one() -> u64 {
    1
}

fn default_retry() -> u32 {
    3
}

/// Immutable part of a check, shared with the task that runs it.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckSpec {
    pub name: String,
    pub command: String,
    pub interval: u64,
    pub retry: u32,
    pub retry_interval: u64,
    pub nagios_performance: bool,
}

/// Mutable per-check state carried from tick to tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckState {
    pub failures: u32,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone)]
pub struct Check {
    pub spec: Arc<CheckSpec>,
    pub state: CheckState,
}

impl Check {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            spec: Arc::new(CheckSpec {
                name: name.into(),
                command: command.into(),
                interval: 1,
                retry: default_retry(),
                retry_interval: 1,
                nagios_performance: false,
            }),
            state: CheckState::default(),
        }
    }

    pub fn from_definition(name: String, def: CheckDefinition) -> Result<Self, ThresholdError> {
        let thresholds = match &def.thresholds {
            Some(text) => Thresholds::parse(text)?,
            None => Thresholds::default(),
        };
        Ok(Self {
            spec: Arc::new(CheckSpec {
                name,
                command: def.command,
                interval: def.interval,
                retry: def.retry,
                retry_interval: def.retry_interval,
                nagios_performance: def.nagios_performance,
            }),
            state: CheckState {
                failures: 0,
                thresholds,
            },
        })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn failures(&self) -> u32 {
        self.state.failures
    }

    pub fn should_run(&self, tick: u64) -> bool {
        should_run(
            self.spec.interval,
            self.spec.retry_interval,
            self.state.failures,
            tick,
        )
    }

    pub fn with_interval(mut self, interval: u64) -> Self {
        Arc::make_mut(&mut self.spec).interval = interval;
        self
    }

    pub fn with_retry(mut self, retry: u32, retry_interval: u64) -> Self {
        let spec = Arc::make_mut(&mut self.spec);
        spec.retry = retry;
        spec.retry_interval = retry_interval;
        self
    }

    pub fn with_nagios_performance(mut self) -> Self {
        Arc::make_mut(&mut self.spec).nagios_performance = true;
        self
    }

    pub fn with_thresholds(mut self, definition: &str) -> Result<Self, ThresholdError> {
        self.state.thresholds = Thresholds::parse(definition)?;
        Ok(self)
    }
}
