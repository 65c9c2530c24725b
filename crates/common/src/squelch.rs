use serde::{Deserialize, Serialize};

/// Alert suppression for every fault whose name the regex finds a match in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Squelch {
    pub regex: String,
    pub reason: String,
    pub user: String,
    pub time_ms: i64,
    #[serde(default)]
    pub permanent: bool,
}
