use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use super::traits::{friendly_name, AlertError, Alerter};

pub const EVENTS_URL: &str =
    "https://events.pagerduty.com/generic/2010-04-15/create_event.json";

/// Generic events API v1. The fault name is the incident key, so repeated
/// triggers for the same fault collapse into one incident.
pub struct PagerDutyAlerter {
    token: String,
    service_key: String,
    url: String,
    client: Client,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PagerDutyEvent<'a> {
    pub service_key: &'a str,
    pub event_type: &'static str,
    pub incident_key: &'a str,
    pub description: String,
}

impl PagerDutyAlerter {
    pub fn new(token: String, service_key: String) -> Self {
        Self::with_url(token, service_key, EVENTS_URL.to_string())
    }

    pub fn with_url(token: String, service_key: String, url: String) -> Self {
        Self {
            token,
            service_key,
            url,
            client: Client::new(),
        }
    }

    pub fn trigger_event<'a>(&'a self, name: &'a str, message: &str) -> PagerDutyEvent<'a> {
        PagerDutyEvent {
            service_key: &self.service_key,
            event_type: "trigger",
            incident_key: name,
            description: format!("{}\n{}", friendly_name(name), message),
        }
    }

    pub fn resolve_event<'a>(&'a self, name: &'a str) -> PagerDutyEvent<'a> {
        PagerDutyEvent {
            service_key: &self.service_key,
            event_type: "resolve",
            incident_key: name,
            description: format!("Cleared: {}", friendly_name(name)),
        }
    }

    async fn send(&self, event: &PagerDutyEvent<'_>) -> Result<(), AlertError> {
        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Token token={}", self.token))
            .json(event)
            .send()
            .await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(AlertError(format!(
                "pagerduty {} for {}: {status} {body}",
                event.event_type, event.incident_key
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Alerter for PagerDutyAlerter {
    fn name(&self) -> &str {
        "pagerduty"
    }

    async fn trigger(&self, name: &str, message: &str) -> Result<(), AlertError> {
        self.send(&self.trigger_event(name, message)).await
    }

    async fn resolve(&self, name: &str) -> Result<(), AlertError> {
        self.send(&self.resolve_event(name)).await
    }
}
