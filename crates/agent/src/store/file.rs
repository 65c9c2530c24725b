use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use vigil_common::retry::{retry_async, RetryConfig};
use vigil_common::time::now_ms;
use vigil_common::{Fault, Squelch};

use super::traits::{carry_since, AgentHeartbeat, Store, StoreError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    faults: BTreeMap<String, Vec<Fault>>,
    #[serde(default)]
    agents: BTreeMap<String, i64>,
    #[serde(default)]
    squelches: BTreeMap<String, Squelch>,
}

/// JSON document on disk, shared by the agent and the admin CLI.
///
/// Every change is a read-modify-write under a process-local lock; the new
/// document is written to a sibling temp file and renamed into place.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
    retry: RetryConfig,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            retry: RetryConfig {
                jitter_fraction: 0.1,
                ..RetryConfig::default()
            },
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn load(&self) -> Result<Document, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Document::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, doc: &Document) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(doc)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn retrying<T, F, Fut>(&self, what: &str, f: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        retry_async(&self.retry, what, StoreError::is_transient, f)
            .await
            .map_err(|e| {
                if e.is_transient() {
                    StoreError::Exhausted {
                        what: what.to_string(),
                        attempts: self.retry.max_attempts,
                        last: e.to_string(),
                    }
                } else {
                    e
                }
            })
    }

    async fn read(&self, what: &str) -> Result<Document, StoreError> {
        self.retrying(what, || self.load()).await
    }

    async fn update<T, C>(&self, what: &str, change: C) -> Result<T, StoreError>
    where
        C: FnOnce(&mut Document) -> Result<T, StoreError> + Send,
    {
        let _guard = self.lock.lock().await;
        let mut doc = self.read(what).await?;
        let out = change(&mut doc)?;
        self.retrying(what, || self.save(&doc)).await?;
        Ok(out)
    }
}

#[async_trait]
impl Store for FileStore {
    async fn get_faults(&self, agent: &str) -> Result<Vec<Fault>, StoreError> {
        let mut doc = self.read("get_faults").await?;
        Ok(doc.faults.remove(agent).unwrap_or_default())
    }

    async fn set_faults(&self, agent: &str, mut faults: Vec<Fault>) -> Result<(), StoreError> {
        self.update("set_faults", move |doc| {
            let now = now_ms();
            let previous = doc.faults.remove(agent).unwrap_or_default();
            carry_since(&previous, &mut faults, now);
            doc.faults.insert(agent.to_string(), faults);
            doc.agents.insert(agent.to_string(), now);
            Ok(())
        })
        .await
    }

    async fn get_squelches(&self) -> Result<Vec<String>, StoreError> {
        let doc = self.read("get_squelches").await?;
        Ok(doc.squelches.into_keys().collect())
    }

    async fn get_squelch_details(&self) -> Result<Vec<Squelch>, StoreError> {
        let doc = self.read("get_squelch_details").await?;
        Ok(doc.squelches.into_values().collect())
    }

    async fn squelch(
        &self,
        regex: &str,
        reason: &str,
        user: &str,
        permanent: bool,
    ) -> Result<(), StoreError> {
        let squelch = Squelch {
            regex: regex.to_string(),
            reason: reason.to_string(),
            user: user.to_string(),
            time_ms: now_ms(),
            permanent,
        };
        self.update("squelch", move |doc| {
            doc.squelches.insert(squelch.regex.clone(), squelch);
            Ok(())
        })
        .await
    }

    async fn unsquelch(&self, regex: &str) -> Result<(), StoreError> {
        self.update("unsquelch", |doc| {
            doc.squelches
                .remove(regex)
                .map(|_| ())
                .ok_or_else(|| StoreError::NotFound(format!("squelch {regex:?}")))
        })
        .await
    }

    async fn old_agents(&self, age: Duration) -> Result<Vec<AgentHeartbeat>, StoreError> {
        let cutoff = now_ms() - age.as_millis() as i64;
        let doc = self.read("old_agents").await?;
        Ok(doc
            .agents
            .into_iter()
            .filter(|(_, updated)| *updated < cutoff)
            .map(|(name, updated_ms)| AgentHeartbeat { name, updated_ms })
            .collect())
    }

    async fn remove_agent(&self, agent: &str) -> Result<(), StoreError> {
        self.update("remove_agent", |doc| {
            doc.agents.remove(agent);
            doc.faults.remove(agent);
            Ok(())
        })
        .await
    }
}
