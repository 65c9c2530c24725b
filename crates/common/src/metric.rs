use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub timestamp_ms: i64,
}

impl Metric {
    pub fn new(name: impl Into<String>, value: f64, units: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            units: units.into(),
            timestamp_ms: 0,
        }
    }
}
