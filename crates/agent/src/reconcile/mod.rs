//! Turns one tick's check results into persisted faults and alert calls.
//!
//! Critical faults that are not squelched are triggered unless the alerter
//! already has them with the same message. Criticals that went away are
//! resolved, but only for checks that actually ran this tick, so a check
//! waiting for its next interval never clears its own alerts.

mod critical;
mod dispatch;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use vigil_common::fault::check_name_of;
use vigil_common::time::now_ms;
use vigil_common::{Fault, Severity};

pub use critical::{CriticalSet, Notified};
pub use dispatch::{dispatch, AlertCall, DispatchReport};

use crate::alerter::Alerter;
use crate::store::{Store, StoreError};

/// Faults from one check that ran this tick, with unqualified names.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub check: String,
    pub faults: Vec<Fault>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub faults: Vec<Fault>,
    pub critical: CriticalSet,
    pub alerts_total: usize,
    pub alerts_failed: usize,
}

pub struct Reconciler {
    agent: String,
    store: Arc<dyn Store>,
    alerter: Arc<dyn Alerter>,
    alert_timeout: Duration,
}

/// `check#sub`, or the bare check name for an unnamed fault.
pub fn qualify(check: &str, sub: &str) -> String {
    if sub.is_empty() {
        check.to_string()
    } else {
        format!("{check}#{sub}")
    }
}

impl Reconciler {
    pub fn new(
        agent: String,
        store: Arc<dyn Store>,
        alerter: Arc<dyn Alerter>,
        alert_timeout: Duration,
    ) -> Self {
        Self {
            agent,
            store,
            alerter,
            alert_timeout,
        }
    }

    pub async fn reconcile(
        &self,
        prior: &CriticalSet,
        results: Vec<CheckResult>,
    ) -> Result<TickReport, StoreError> {
        let mut faults = Vec::new();
        let mut checked = HashSet::new();
        let mut squelches: Option<Vec<Regex>> = None;
        let mut new_critical: HashMap<String, usize> = HashMap::new();
        let mut calls = Vec::new();

        for result in results {
            for mut fault in result.faults {
                fault.name = qualify(&result.check, &fault.name);

                if fault.is_critical() {
                    if squelches.is_none() {
                        squelches = Some(self.load_squelches().await?);
                    }
                    let squelch = squelches
                        .iter()
                        .flatten()
                        .find(|re| re.is_match(&fault.name));

                    match squelch {
                        Some(re) => {
                            tracing::debug!(fault = %fault.name, squelch = %re, "critical fault squelched");
                        }
                        None => {
                            if prior.is_triggered_with(&fault.name, &fault.message) {
                                fault.triggered = true;
                            } else {
                                calls.push(AlertCall::Trigger {
                                    name: fault.name.clone(),
                                    message: fault.message.clone(),
                                });
                            }
                            new_critical.insert(fault.name.clone(), faults.len());
                        }
                    }
                }

                faults.push(fault);
            }
            checked.insert(result.check);
        }

        let mut resolves: Vec<&str> = prior
            .names()
            .filter(|name| !new_critical.contains_key(*name))
            .filter(|name| checked.contains(check_name_of(name)))
            .collect();
        resolves.sort_unstable();
        calls.extend(resolves.into_iter().map(|name| AlertCall::Resolve {
            name: name.to_string(),
        }));

        let report = dispatch(self.alerter.clone(), calls, self.alert_timeout).await;

        let mut critical = CriticalSet::new();
        for (name, index) in new_critical {
            let fault = &mut faults[index];
            if report.triggered.contains(&name) {
                fault.triggered = true;
            }
            let state = if fault.triggered {
                Notified::Triggered(fault.message.clone())
            } else {
                Notified::Pending
            };
            critical.insert(name, state);
        }
        // Checks that did not run this tick keep their alert state.
        for (name, state) in prior.iter() {
            if !checked.contains(check_name_of(name)) {
                critical.insert(name.to_string(), state.clone());
            }
        }

        if report.failed > 0 {
            let mut fault = Fault::new(
                format!("{}#alerts", self.agent),
                Severity::Critical,
                format!(
                    "Failed to send alert information ({}/{})",
                    report.failed, report.total
                ),
            );
            fault.updated_ms = now_ms();
            faults.push(fault);
        }

        Ok(TickReport {
            faults,
            critical,
            alerts_total: report.total,
            alerts_failed: report.failed,
        })
    }

    async fn load_squelches(&self) -> Result<Vec<Regex>, StoreError> {
        let patterns = self.store.get_squelches().await?;
        Ok(patterns
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!(squelch = %p, error = %e, "ignoring invalid squelch");
                    None
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerter::{AlertRecord, RecordingAlerter};
    use crate::store::MemoryStore;

    const CHECK: &str = "//h/disk/root";

    fn setup() -> (MemoryStore, RecordingAlerter, Reconciler) {
        let store = MemoryStore::new();
        let alerter = RecordingAlerter::new();
        let reconciler = Reconciler::new(
            "h".into(),
            Arc::new(store.clone()),
            Arc::new(alerter.clone()),
            Duration::from_secs(5),
        );
        (store, alerter, reconciler)
    }

    fn result(check: &str, faults: Vec<Fault>) -> CheckResult {
        CheckResult {
            check: check.into(),
            faults,
        }
    }

    fn critical(sub: &str, message: &str) -> Fault {
        Fault::new(sub, Severity::Critical, message)
    }

    #[test]
    fn qualified_names() {
        assert_eq!(qualify(CHECK, ""), CHECK);
        assert_eq!(qualify(CHECK, "monitor-stderr"), "//h/disk/root#monitor-stderr");
    }

    #[tokio::test]
    async fn new_critical_is_triggered_and_remembered() {
        let (_, alerter, reconciler) = setup();
        let report = reconciler
            .reconcile(
                &CriticalSet::new(),
                vec![result(CHECK, vec![critical("", "full"), Fault::new("w", Severity::Warning, "x")])],
            )
            .await
            .unwrap();

        assert_eq!(report.faults.len(), 2);
        assert!(report.faults[0].triggered);
        assert!(!report.faults[1].triggered);
        assert_eq!(report.faults[1].name, "//h/disk/root#w");
        assert!(report.critical.is_triggered_with(CHECK, "full"));
        assert_eq!(
            alerter.records().await,
            vec![AlertRecord::Trigger {
                name: CHECK.into(),
                message: "full".into()
            }]
        );
    }

    #[tokio::test]
    async fn unchanged_critical_is_not_retriggered() {
        let (_, alerter, reconciler) = setup();
        let first = reconciler
            .reconcile(&CriticalSet::new(), vec![result(CHECK, vec![critical("", "full")])])
            .await
            .unwrap();
        let second = reconciler
            .reconcile(&first.critical, vec![result(CHECK, vec![critical("", "full")])])
            .await
            .unwrap();

        assert!(second.faults[0].triggered);
        assert_eq!(second.alerts_total, 0);
        assert_eq!(alerter.records().await.len(), 1);
    }

    #[tokio::test]
    async fn changed_message_retriggers() {
        let (_, alerter, reconciler) = setup();
        let first = reconciler
            .reconcile(&CriticalSet::new(), vec![result(CHECK, vec![critical("", "90%")])])
            .await
            .unwrap();
        reconciler
            .reconcile(&first.critical, vec![result(CHECK, vec![critical("", "99%")])])
            .await
            .unwrap();
        assert_eq!(alerter.records().await.len(), 2);
    }

    #[tokio::test]
    async fn cleared_critical_is_resolved_only_when_its_check_ran() {
        let (_, alerter, reconciler) = setup();
        let mut prior = CriticalSet::new();
        prior.insert(format!("{CHECK}#monitor-status"), Notified::Triggered("x".into()));
        prior.insert("//h/net/ping".into(), Notified::Triggered("y".into()));

        let report = reconciler
            .reconcile(&prior, vec![result(CHECK, vec![])])
            .await
            .unwrap();

        assert_eq!(report.critical.len(), 1);
        assert_eq!(
            report.critical.get("//h/net/ping"),
            Some(&Notified::Triggered("y".into()))
        );
        assert_eq!(
            alerter.records().await,
            vec![AlertRecord::Resolve {
                name: format!("{CHECK}#monitor-status")
            }]
        );
    }

    #[tokio::test]
    async fn skipped_check_keeps_its_critical_until_it_runs_again() {
        let (_, alerter, reconciler) = setup();
        let mut prior = CriticalSet::new();
        prior.insert("//h/net/ping".into(), Notified::Triggered("unreachable".into()));

        let skipped = reconciler
            .reconcile(&prior, vec![result(CHECK, vec![])])
            .await
            .unwrap();
        assert!(skipped.critical.is_triggered_with("//h/net/ping", "unreachable"));
        assert!(alerter.records().await.is_empty());

        let still_failing = reconciler
            .reconcile(
                &skipped.critical,
                vec![result("//h/net/ping", vec![critical("", "unreachable")])],
            )
            .await
            .unwrap();
        assert!(alerter.records().await.is_empty());
        assert!(still_failing.faults[0].triggered);

        reconciler
            .reconcile(&still_failing.critical, vec![result("//h/net/ping", vec![])])
            .await
            .unwrap();
        assert_eq!(
            alerter.records().await,
            vec![AlertRecord::Resolve {
                name: "//h/net/ping".into()
            }]
        );
    }

    #[tokio::test]
    async fn squelched_critical_is_persisted_but_not_triggered() {
        let (store, alerter, reconciler) = setup();
        store.squelch("disk/ro+t$", "maintenance", "ops", false).await.unwrap();
        store.squelch("([unclosed", "typo", "ops", false).await.unwrap();

        let report = reconciler
            .reconcile(&CriticalSet::new(), vec![result(CHECK, vec![critical("", "full")])])
            .await
            .unwrap();

        assert_eq!(report.faults.len(), 1);
        assert!(!report.faults[0].triggered);
        assert!(report.critical.is_empty());
        assert!(alerter.records().await.is_empty());
    }

    #[tokio::test]
    async fn failed_trigger_stays_pending_and_adds_alert_fault() {
        let (_, alerter, reconciler) = setup();
        alerter.fail_next(1);
        let report = reconciler
            .reconcile(&CriticalSet::new(), vec![result(CHECK, vec![critical("", "full")])])
            .await
            .unwrap();

        assert_eq!(report.critical.get(CHECK), Some(&Notified::Pending));
        assert!(!report.faults[0].triggered);
        let alerts = report.faults.last().unwrap();
        assert_eq!(alerts.name, "h#alerts");
        assert_eq!(alerts.severity, Severity::Critical);
        assert_eq!(alerts.message, "Failed to send alert information (1/1)");

        let retry = reconciler
            .reconcile(&report.critical, vec![result(CHECK, vec![critical("", "full")])])
            .await
            .unwrap();
        assert!(retry.faults[0].triggered);
        assert_eq!(alerter.records().await.len(), 1);
    }

    #[tokio::test]
    async fn non_critical_faults_skip_alerting() {
        let (store, _, reconciler) = setup();
        store.squelch("(", "broken", "ops", true).await.unwrap();
        let report = reconciler
            .reconcile(
                &CriticalSet::new(),
                vec![result(CHECK, vec![Fault::new("", Severity::Error, "e")])],
            )
            .await
            .unwrap();
        assert_eq!(report.alerts_total, 0);
        assert!(report.critical.is_empty());
    }
}
