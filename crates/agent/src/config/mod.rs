mod checks;
mod loader;
mod schema;

pub use checks::{check_name, load_checks};
pub use loader::{load_from_file, load_from_str, LoadError};
pub use schema::{AgentSection, AlerterConfig, Config, DatabaseConfig, MetricsConfig};
