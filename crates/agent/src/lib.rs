pub mod agent;
pub mod alerter;
pub mod check;
pub mod cli;
pub mod config;
pub mod meta;
pub mod metrics;
pub mod reconcile;
pub mod registry;
pub mod run;
pub mod scheduler;
pub mod shutdown;
pub mod store;
pub mod threshold;

pub use agent::{Agent, AgentError, AgentSettings, TickSummary};
