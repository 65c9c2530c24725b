use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vigil_common::{Fault, Squelch};

#[async_trait]
pub trait Store: Send + Sync {
    async fn get_faults(&self, agent: &str) -> Result<Vec<Fault>, StoreError>;

    /// Replace the agent's faults and record a heartbeat. `since` carries
    /// over for names that were already faulted.
    async fn set_faults(&self, agent: &str, faults: Vec<Fault>) -> Result<(), StoreError>;

    /// Squelch patterns only, sorted.
    async fn get_squelches(&self) -> Result<Vec<String>, StoreError>;

    async fn get_squelch_details(&self) -> Result<Vec<Squelch>, StoreError>;

    async fn squelch(
        &self,
        regex: &str,
        reason: &str,
        user: &str,
        permanent: bool,
    ) -> Result<(), StoreError>;

    async fn unsquelch(&self, regex: &str) -> Result<(), StoreError>;

    /// Agents whose last heartbeat is older than `age`.
    async fn old_agents(&self, age: Duration) -> Result<Vec<AgentHeartbeat>, StoreError>;

    async fn remove_agent(&self, agent: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentHeartbeat {
    pub name: String,
    pub updated_ms: i64,
}

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Exhausted {
        what: String,
        attempts: u32,
        last: String,
    },
    NotFound(String),
}

impl StoreError {
    /// I/O failures may clear up on their own; everything else is final.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Serialization(e) => write!(f, "serialization: {e}"),
            Self::Exhausted {
                what,
                attempts,
                last,
            } => write!(f, "{what} failed after {attempts} attempts: {last}"),
            Self::NotFound(what) => write!(f, "not found: {what}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}

/// Preserve `since` for names present in `previous`; new names start now.
pub fn carry_since(previous: &[Fault], faults: &mut [Fault], now_ms: i64) {
    let since: HashMap<&str, i64> = previous
        .iter()
        .filter_map(|f| f.since_ms.map(|s| (f.name.as_str(), s)))
        .collect();

    for fault in faults {
        let fresh = if fault.updated_ms > 0 {
            fault.updated_ms
        } else {
            now_ms
        };
        fault.since_ms = Some(since.get(fault.name.as_str()).copied().unwrap_or(fresh));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_common::Severity;

    fn fault(name: &str, updated: i64, since: Option<i64>) -> Fault {
        Fault {
            updated_ms: updated,
            since_ms: since,
            ..Fault::new(name, Severity::Error, "")
        }
    }

    #[test]
    fn since_is_carried_for_persisting_names() {
        let previous = vec![fault("a", 100, Some(50)), fault("gone", 100, Some(10))];
        let mut current = vec![fault("a", 200, None), fault("b", 200, None)];
        carry_since(&previous, &mut current, 999);

        assert_eq!(current[0].since_ms, Some(50));
        assert_eq!(current[1].since_ms, Some(200));
    }

    #[test]
    fn unstamped_fault_gets_now() {
        let mut current = vec![fault("a", 0, None)];
        carry_since(&[], &mut current, 999);
        assert_eq!(current[0].since_ms, Some(999));
    }

    #[test]
    fn only_io_errors_are_transient() {
        let io = StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(io.is_transient());
        assert!(!StoreError::NotFound("x".into()).is_transient());
        let exhausted = StoreError::Exhausted {
            what: "write".into(),
            attempts: 3,
            last: "io: disk".into(),
        };
        assert_eq!(exhausted.to_string(), "write failed after 3 attempts: io: disk");
    }
}
