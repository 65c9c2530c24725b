use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use vigil_common::Fault;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    pub agent: AgentSection,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub alerter: AlerterConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AgentSection {
    pub name: Option<String>,
    #[serde(default)]
    pub directory: String,
    #[serde(default = "default_base_interval")]
    pub base_interval: f64,
    pub timeout: Option<f64>,
    pub alert_timeout: Option<f64>,
    #[serde(default = "default_logging")]
    pub logging: String,
}

impl AgentSection {
    /// Configured name, or this machine's host name.
    pub fn resolved_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| sysinfo::System::host_name().unwrap_or_else(|| "localhost".into()))
    }

    pub fn base_interval(&self) -> Duration {
        Duration::from_secs_f64(self.base_interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout.unwrap_or(self.base_interval * 0.7))
    }

    pub fn alert_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.alert_timeout.unwrap_or(self.base_interval * 0.2))
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DatabaseConfig {
    Memory {
        #[serde(default)]
        faults: HashMap<String, Vec<Fault>>,
    },
    File {
        path: String,
    },
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AlerterConfig {
    #[default]
    Log,
    Slack {
        webhook_url: String,
        target: Option<String>,
    },
    PagerDuty {
        token: String,
        service: String,
    },
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MetricsConfig {
    #[default]
    Log,
    #[serde(rename = "none")]
    Disabled,
}

fn default_base_interval() -> f64 {
    60.0
}

fn default_logging() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full() {
        let yaml = r#"
agent:
  name: web1.example.com
  directory: /etc/vigil/checks
  base_interval: 30
  timeout: 20
  alert_timeout: 5
  logging: debug
database:
  kind: file
  path: /var/lib/vigil/state.json
alerter:
  kind: pagerduty
  token: abc
  service: def
metrics:
  kind: none
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.agent.resolved_name(), "web1.example.com");
        assert_eq!(cfg.agent.timeout(), Duration::from_secs(20));
        assert_eq!(cfg.agent.alert_timeout(), Duration::from_secs(5));
        assert_eq!(
            cfg.database,
            DatabaseConfig::File {
                path: "/var/lib/vigil/state.json".into()
            }
        );
        assert_eq!(
            cfg.alerter,
            AlerterConfig::PagerDuty {
                token: "abc".into(),
                service: "def".into()
            }
        );
        assert_eq!(cfg.metrics, MetricsConfig::Disabled);
    }

    #[test]
    fn defaults_applied() {
        let yaml = r#"
agent:
  directory: checks
database:
  kind: memory
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.agent.base_interval(), Duration::from_secs(60));
        assert_eq!(cfg.agent.timeout(), Duration::from_secs(42));
        assert_eq!(cfg.agent.alert_timeout(), Duration::from_secs(12));
        assert_eq!(cfg.agent.logging, "info");
        assert!(!cfg.agent.resolved_name().is_empty());
        assert_eq!(cfg.alerter, AlerterConfig::Log);
        assert_eq!(cfg.metrics, MetricsConfig::Log);
    }

    #[test]
    fn memory_store_seeds_faults() {
        let yaml = r#"
agent:
  directory: checks
database:
  kind: memory
  faults:
    web1:
      - name: //web1/disk/root
        severity: 50
        message: full
        triggered: true
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        let DatabaseConfig::Memory { faults } = cfg.database else {
            panic!("expected memory database");
        };
        assert_eq!(faults["web1"][0].message, "full");
        assert!(faults["web1"][0].triggered);
    }

    #[test]
    fn unknown_kind_rejected() {
        let yaml = r#"
agent:
  directory: checks
database:
  kind: dynamodb
"#;
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }
}
