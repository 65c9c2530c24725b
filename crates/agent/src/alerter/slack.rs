use async_trait::async_trait;
use reqwest::Client;

use super::traits::{friendly_name, AlertError, Alerter};

pub struct SlackAlerter {
    webhook_url: String,
    target: Option<String>,
    client: Client,
}

impl SlackAlerter {
    pub fn new(webhook_url: String, target: Option<String>) -> Self {
        Self {
            webhook_url,
            target,
            client: Client::new(),
        }
    }

    fn text(&self, body: String) -> String {
        match &self.target {
            Some(target) => format!("{target} {body}"),
            None => body,
        }
    }

    async fn post(&self, text: String) -> Result<(), AlertError> {
        let payload = serde_json::json!({ "text": text });
        self.client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

pub fn trigger_text(name: &str, message: &str) -> String {
    format!("_*Alert*_: *{}*: {}", friendly_name(name), message)
}

pub fn resolve_text(name: &str) -> String {
    format!("*Clear*: *{}*", friendly_name(name))
}

#[async_trait]
impl Alerter for SlackAlerter {
    fn name(&self) -> &str {
        "slack"
    }

    async fn trigger(&self, name: &str, message: &str) -> Result<(), AlertError> {
        self.post(self.text(trigger_text(name, message))).await
    }

    async fn resolve(&self, name: &str) -> Result<(), AlertError> {
        self.post(self.text(resolve_text(name))).await
    }
}
