use anyhow::{Context, Result};
use vigil_agent::meta::{meta_check, MetaOptions};
use vigil_common::time::now_ms;

use super::helpers;
use crate::output::print_compact_json;

#[derive(clap::Args)]
pub struct MetaCheckArgs {
    #[arg(short, long, default_value_t = 2, help = "Base intervals before an agent is a warning")]
    warn: u32,
    #[arg(short, long, default_value_t = 5, help = "Base intervals before an agent is an error")]
    error: u32,
    #[arg(
        short = 's',
        long,
        default_value_t = 60,
        help = "Minutes a non-permanent squelch may stay"
    )]
    global_squelch_age: u64,
}

impl MetaCheckArgs {
    pub fn options(&self) -> MetaOptions {
        MetaOptions {
            warn: self.warn,
            error: self.error,
            global_squelch_age: self.global_squelch_age,
        }
    }
}

/// Always prints JSON: the output is read back by the agent as a check report.
pub async fn execute(args: MetaCheckArgs, config_path: Option<&str>) -> Result<()> {
    let config = helpers::load_config(config_path)?;
    let store = helpers::open_store(&config);
    let report = meta_check(
        store.as_ref(),
        config.agent.base_interval(),
        &args.options(),
        now_ms(),
    )
    .await
    .context("running meta-check")?;
    print_compact_json(&report)
}
