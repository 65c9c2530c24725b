use async_trait::async_trait;

use super::traits::{friendly_name, AlertError, Alerter};

/// Writes alerts to the log instead of paging anyone.
#[derive(Debug, Default)]
pub struct LogAlerter;

#[async_trait]
impl Alerter for LogAlerter {
    fn name(&self) -> &str {
        "log"
    }

    async fn trigger(&self, name: &str, message: &str) -> Result<(), AlertError> {
        tracing::warn!(fault = %name, friendly = %friendly_name(name), message, "alert triggered");
        Ok(())
    }

    async fn resolve(&self, name: &str) -> Result<(), AlertError> {
        tracing::info!(fault = %name, friendly = %friendly_name(name), "alert resolved");
        Ok(())
    }
}
