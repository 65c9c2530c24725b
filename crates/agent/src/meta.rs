//! Monitoring of the monitors: agents that stopped reporting and squelches
//! somebody forgot to lift. The report is printed as a JSON check result so
//! an ordinary check can run it.

use std::time::Duration;

use serde::Serialize;
use vigil_common::{Fault, Severity};

use crate::store::{Store, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub struct MetaOptions {
    /// Agent age, in base intervals, that earns a warning.
    pub warn: u32,
    /// Agent age, in base intervals, that earns an error.
    pub error: u32,
    /// Minutes a non-permanent squelch may stay in place.
    pub global_squelch_age: u64,
}

impl Default for MetaOptions {
    fn default() -> Self {
        Self {
            warn: 2,
            error: 5,
            global_squelch_age: 60,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaReport {
    pub faults: Vec<Fault>,
}

pub async fn meta_check(
    store: &dyn Store,
    base_interval: Duration,
    options: &MetaOptions,
    now_ms: i64,
) -> Result<MetaReport, StoreError> {
    let warn = base_interval * options.warn;
    let error_ms = (base_interval * options.error).as_millis() as i64;
    let max_squelch_ms = options.global_squelch_age as i64 * 60_000;

    let mut faults = Vec::new();

    for agent in store.old_agents(warn).await? {
        let age = now_ms - agent.updated_ms;
        let severity = if age > error_ms {
            Severity::Error
        } else {
            Severity::Warning
        };
        faults.push(Fault::new(agent.name, severity, "Inactive agent"));
    }

    for squelch in store.get_squelch_details().await? {
        if squelch.permanent {
            continue;
        }
        let age = now_ms - squelch.time_ms;
        if age > max_squelch_ms {
            faults.push(Fault::new(
                format!("squelch-{}", urlencoding::encode(&squelch.regex)),
                Severity::Error,
                format!(
                    "Alerts squelched {} minutes ago by {} because {}",
                    age / 60_000,
                    squelch.user,
                    squelch.reason
                ),
            ));
        }
    }

    Ok(MetaReport { faults })
}
