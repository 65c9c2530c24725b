use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use crate::alerter::Alerter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertCall {
    Trigger { name: String, message: String },
    Resolve { name: String },
}

impl AlertCall {
    pub fn name(&self) -> &str {
        match self {
            Self::Trigger { name, .. } | Self::Resolve { name } => name,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Trigger { .. } => "trigger",
            Self::Resolve { .. } => "resolve",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DispatchReport {
    pub total: usize,
    pub failed: usize,
    /// Names whose trigger call went through.
    pub triggered: HashSet<String>,
}

/// Run every call concurrently under one shared deadline. Calls still
/// running at the deadline are aborted and count as failed.
pub async fn dispatch(
    alerter: Arc<dyn Alerter>,
    calls: Vec<AlertCall>,
    timeout: Duration,
) -> DispatchReport {
    let deadline = Instant::now() + timeout;
    let mut report = DispatchReport {
        total: calls.len(),
        ..Default::default()
    };

    let handles: Vec<_> = calls
        .into_iter()
        .map(|call| {
            let alerter = alerter.clone();
            let task_call = call.clone();
            let handle = tokio::spawn(async move {
                match &task_call {
                    AlertCall::Trigger { name, message } => alerter.trigger(name, message).await,
                    AlertCall::Resolve { name } => alerter.resolve(name).await,
                }
            });
            (call, handle)
        })
        .collect();

    for (call, mut handle) in handles {
        match timeout_at(deadline, &mut handle).await {
            Ok(Ok(Ok(()))) => {
                tracing::debug!(fault = %call.name(), kind = call.kind(), "alert sent");
                if let AlertCall::Trigger { name, .. } = call {
                    report.triggered.insert(name);
                }
            }
            Ok(Ok(Err(e))) => {
                report.failed += 1;
                tracing::error!(fault = %call.name(), kind = call.kind(), error = %e, "alert failed");
            }
            Ok(Err(e)) => {
                report.failed += 1;
                tracing::error!(fault = %call.name(), kind = call.kind(), error = %e, "alert task failed");
            }
            Err(_) => {
                handle.abort();
                report.failed += 1;
                tracing::error!(fault = %call.name(), kind = call.kind(), "alert failed: timeout");
            }
        }
    }

    report
}
