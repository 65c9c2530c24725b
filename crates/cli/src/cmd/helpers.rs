use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use vigil_agent::config::{load_from_file, Config};
use vigil_agent::registry;
use vigil_agent::store::Store;

pub fn default_config_path() -> PathBuf {
    if let Some(dir) = dirs::config_dir() {
        return dir.join("vigil").join("agent.yml");
    }
    PathBuf::from("/etc/vigil/agent.yml")
}

pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    load_from_file(&path).with_context(|| format!("loading config from {}", path.display()))
}

pub fn open_store(config: &Config) -> Arc<dyn Store> {
    registry::build_store(&config.database)
}

/// The person behind the command: the invoking user under sudo, else `USER`.
pub fn current_user(var: impl Fn(&str) -> Option<String>) -> String {
    let user = var("USER").unwrap_or_default();
    if user == "root" {
        if let Some(sudo) = var("SUDO_USER").filter(|u| !u.is_empty()) {
            return sudo;
        }
    }
    if user.is_empty() {
        "unknown".to_string()
    } else {
        user
    }
}

pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
