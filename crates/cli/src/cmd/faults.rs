use anyhow::{Context, Result};

use super::helpers;
use crate::output::{fault_table, print_json, print_success, theme, OutputMode};

#[derive(clap::Args)]
pub struct FaultsArgs {
    #[arg(help = "Agent name (default: the configured agent)")]
    agent: Option<String>,
}

pub async fn execute(args: FaultsArgs, mode: OutputMode, config_path: Option<&str>) -> Result<()> {
    let config = helpers::load_config(config_path)?;
    let agent = args
        .agent
        .unwrap_or_else(|| config.agent.resolved_name());
    let faults = helpers::open_store(&config)
        .get_faults(&agent)
        .await
        .with_context(|| format!("reading faults of {agent}"))?;

    match mode {
        OutputMode::Json => print_json(&faults)?,
        OutputMode::Human => {
            if faults.is_empty() {
                print_success(&format!("No faults for {agent}"));
                return Ok(());
            }
            theme::print_header(&format!("Faults: {agent}"));
            println!("{}", fault_table(&faults));
        }
    }
    Ok(())
}
