use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use vigil_common::time::now_ms;
use vigil_common::{Fault, Squelch};

use super::traits::{carry_since, AgentHeartbeat, Store, StoreError};

/// In-process store. Clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    faults: Arc<DashMap<String, Vec<Fault>>>,
    agents: Arc<DashMap<String, i64>>,
    squelches: Arc<DashMap<String, Squelch>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_faults(faults: HashMap<String, Vec<Fault>>) -> Self {
        let store = Self::new();
        for (agent, list) in faults {
            store.faults.insert(agent, list);
        }
        store
    }

    pub fn record_heartbeat(&self, agent: &str, updated_ms: i64) {
        self.agents.insert(agent.to_string(), updated_ms);
    }

    pub fn insert_squelch(&self, squelch: Squelch) {
        self.squelches.insert(squelch.regex.clone(), squelch);
    }

    pub fn heartbeat(&self, agent: &str) -> Option<i64> {
        self.agents.get(agent).map(|v| *v)
    }

    /// Make `set_faults` fail until turned off again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_faults(&self, agent: &str) -> Result<Vec<Fault>, StoreError> {
        Ok(self.faults.get(agent).map(|f| f.clone()).unwrap_or_default())
    }

    async fn set_faults(&self, agent: &str, mut faults: Vec<Fault>) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Exhausted {
                what: "set_faults".into(),
                attempts: 1,
                last: "writes disabled".into(),
            });
        }
        let now = now_ms();
        let previous = self.faults.get(agent).map(|f| f.clone()).unwrap_or_default();
        carry_since(&previous, &mut faults, now);
        self.faults.insert(agent.to_string(), faults);
        self.agents.insert(agent.to_string(), now);
        Ok(())
    }

    async fn get_squelches(&self) -> Result<Vec<String>, StoreError> {
        let mut regexes: Vec<String> = self.squelches.iter().map(|s| s.key().clone()).collect();
        regexes.sort();
        Ok(regexes)
    }

    async fn get_squelch_details(&self) -> Result<Vec<Squelch>, StoreError> {
        let mut details: Vec<Squelch> = self.squelches.iter().map(|s| s.value().clone()).collect();
        details.sort_by(|a, b| a.regex.cmp(&b.regex));
        Ok(details)
    }

    async fn squelch(
        &self,
        regex: &str,
        reason: &str,
        user: &str,
        permanent: bool,
    ) -> Result<(), StoreError> {
        self.insert_squelch(Squelch {
            regex: regex.to_string(),
            reason: reason.to_string(),
            user: user.to_string(),
            time_ms: now_ms(),
            permanent,
        });
        Ok(())
    }

    async fn unsquelch(&self, regex: &str) -> Result<(), StoreError> {
        self.squelches
            .remove(regex)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("squelch {regex:?}")))
    }

    async fn old_agents(&self, age: Duration) -> Result<Vec<AgentHeartbeat>, StoreError> {
        let cutoff = now_ms() - age.as_millis() as i64;
        let mut old: Vec<AgentHeartbeat> = self
            .agents
            .iter()
            .filter(|a| *a.value() < cutoff)
            .map(|a| AgentHeartbeat {
                name: a.key().clone(),
                updated_ms: *a.value(),
            })
            .collect();
        old.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(old)
    }

    async fn remove_agent(&self, agent: &str) -> Result<(), StoreError> {
        self.agents.remove(agent);
        self.faults.remove(agent);
        Ok(())
    }
}
