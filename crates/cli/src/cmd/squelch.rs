use anyhow::{bail, Context, Result};
use regex::Regex;
use vigil_agent::config::DatabaseConfig;

use super::helpers;
use crate::output::{print_json, print_success, squelch_table, theme, OutputMode};

#[derive(clap::Args)]
pub struct SquelchArgs {
    #[arg(help = "Regex searched for in fault names")]
    regex: String,
    #[arg(help = "Why alerts are squelched")]
    reason: String,
    #[arg(long, help = "Exempt from the meta-check age limit")]
    permanent: bool,
}

#[derive(clap::Args)]
pub struct UnsquelchArgs {
    #[arg(help = "Regex of the squelch to remove")]
    regex: String,
}

/// Reject patterns the agent would skip and squelches nobody can explain.
pub fn validate(regex: &str, reason: &str) -> Result<()> {
    Regex::new(regex).with_context(|| format!("invalid regex {regex:?}"))?;
    if reason.trim().is_empty() {
        bail!("a squelch needs a reason");
    }
    Ok(())
}

pub async fn add(args: SquelchArgs, mode: OutputMode, config_path: Option<&str>) -> Result<()> {
    validate(&args.regex, &args.reason)?;
    let config = helpers::load_config(config_path)?;
    if matches!(config.database, DatabaseConfig::Memory { .. }) && mode == OutputMode::Human {
        theme::print_warning("database kind is memory; the squelch will not outlive this command");
    }

    let user = helpers::current_user(helpers::env_var);
    helpers::open_store(&config)
        .squelch(&args.regex, &args.reason, &user, args.permanent)
        .await
        .context("saving squelch")?;

    match mode {
        OutputMode::Json => print_json(&serde_json::json!({
            "regex": args.regex,
            "reason": args.reason,
            "user": user,
            "permanent": args.permanent,
        }))?,
        OutputMode::Human => print_success(&format!("Squelched {}", args.regex)),
    }
    Ok(())
}

pub async fn remove(args: UnsquelchArgs, mode: OutputMode, config_path: Option<&str>) -> Result<()> {
    let config = helpers::load_config(config_path)?;
    helpers::open_store(&config)
        .unsquelch(&args.regex)
        .await
        .with_context(|| format!("removing squelch {}", args.regex))?;

    match mode {
        OutputMode::Json => print_json(&serde_json::json!({ "removed": args.regex }))?,
        OutputMode::Human => print_success(&format!("Unsquelched {}", args.regex)),
    }
    Ok(())
}

pub async fn list(mode: OutputMode, config_path: Option<&str>) -> Result<()> {
    let config = helpers::load_config(config_path)?;
    let squelches = helpers::open_store(&config)
        .get_squelch_details()
        .await
        .context("reading squelches")?;

    match mode {
        OutputMode::Json => print_json(&squelches)?,
        OutputMode::Human => {
            if squelches.is_empty() {
                print_success("No squelches");
                return Ok(());
            }
            theme::print_header("Squelches");
            println!("{}", squelch_table(&squelches));
        }
    }
    Ok(())
}
