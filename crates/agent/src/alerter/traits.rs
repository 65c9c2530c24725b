use async_trait::async_trait;

#[async_trait]
pub trait Alerter: Send + Sync {
    fn name(&self) -> &str;
    async fn trigger(&self, name: &str, message: &str) -> Result<(), AlertError>;
    async fn resolve(&self, name: &str) -> Result<(), AlertError>;
}

#[derive(Debug)]
pub struct AlertError(pub String);

impl std::fmt::Display for AlertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "alert: {}", self.0)
    }
}

impl std::error::Error for AlertError {}

impl From<reqwest::Error> for AlertError {
    fn from(e: reqwest::Error) -> Self {
        Self(e.to_string())
    }
}

/// `//host/file/section#sub` reads as `host file section#sub`.
pub fn friendly_name(name: &str) -> String {
    let bare = name.strip_prefix("//").unwrap_or(name);
    bare.splitn(3, '/').collect::<Vec<_>>().join(" ")
}
