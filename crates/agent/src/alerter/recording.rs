use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::traits::{AlertError, Alerter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertRecord {
    Trigger { name: String, message: String },
    Resolve { name: String },
}

/// Alerter double that records every successful call. It can be told to
/// fail the next `n` calls or to stall before answering.
#[derive(Clone, Default)]
pub struct RecordingAlerter {
    records: Arc<Mutex<Vec<AlertRecord>>>,
    failures: Arc<AtomicU32>,
    delay: Option<Duration>,
}

impl RecordingAlerter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fail_next(&self, n: u32) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub async fn records(&self) -> Vec<AlertRecord> {
        self.records.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.records.lock().await.clear();
    }

    async fn call(&self, record: AlertRecord) -> Result<(), AlertError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(AlertError("injected failure".into()));
        }
        self.records.lock().await.push(record);
        Ok(())
    }
}

#[async_trait]
impl Alerter for RecordingAlerter {
    fn name(&self) -> &str {
        "recording"
    }

    async fn trigger(&self, name: &str, message: &str) -> Result<(), AlertError> {
        self.call(AlertRecord::Trigger {
            name: name.to_string(),
            message: message.to_string(),
        })
        .await
    }

    async fn resolve(&self, name: &str) -> Result<(), AlertError> {
        self.call(AlertRecord::Resolve {
            name: name.to_string(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_and_injects_failures() {
        let alerter = RecordingAlerter::new();
        alerter.fail_next(1);
        assert!(alerter.trigger("a", "m").await.is_err());
        alerter.trigger("a", "m").await.unwrap();
        alerter.resolve("b").await.unwrap();

        assert_eq!(
            alerter.records().await,
            vec![
                AlertRecord::Trigger {
                    name: "a".into(),
                    message: "m".into()
                },
                AlertRecord::Resolve { name: "b".into() },
            ]
        );
    }
}
