use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vigil_agent::cli::Args;
use vigil_agent::{config, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = config::load_from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.agent.logging)),
        )
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "vigil agent starting");
    let stats = run::run(config, args.count).await.context("agent failed")?;
    tracing::info!(
        ticks = stats.ticks,
        failed_ticks = stats.failed_ticks,
        slow = stats.slow,
        "vigil agent stopped"
    );
    Ok(())
}
