use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Four-level severity scale. The numeric levels match the classic logging
/// levels so check scripts can report either a number or a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn level(self) -> u32 {
        match self {
            Self::Info => 20,
            Self::Warning => 30,
            Self::Error => 40,
            Self::Critical => 50,
        }
    }

    pub fn from_level(level: u32) -> Self {
        match level {
            l if l >= 50 => Self::Critical,
            l if l >= 40 => Self::Error,
            l if l >= 30 => Self::Warning,
            _ => Self::Info,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "info" => Some(Self::Info),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.level())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeverityRepr {
    Level(u32),
    Name(String),
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match SeverityRepr::deserialize(deserializer)? {
            SeverityRepr::Level(level) => Ok(Self::from_level(level)),
            SeverityRepr::Name(name) => Self::from_name(&name)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown severity {name:?}"))),
        }
    }
}

/// A named, severitized observation about a check's health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fault {
    #[serde(default)]
    pub name: String,
    pub severity: Severity,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub updated_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since_ms: Option<i64>,
    #[serde(default)]
    pub triggered: bool,
}

impl Fault {
    pub fn new(name: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            severity,
            message: message.into(),
            updated_ms: 0,
            since_ms: None,
            triggered: false,
        }
    }

    /// Fault raised by the monitoring machinery itself, named `monitor-<what>`.
    pub fn monitor(what: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self::new(format!("monitor-{what}"), severity, message)
    }

    pub fn is_critical(&self) -> bool {
        self.severity >= Severity::Critical
    }
}

pub fn check_name_of(name: &str) -> &str {
    name.split('#').next().unwrap_or(name)
}
