mod faults;
pub(crate) mod helpers;
mod meta_check;
pub(crate) mod squelch;
mod version;

use anyhow::Result;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Stop alerting on faults whose name matches a regex.
    Squelch(squelch::SquelchArgs),
    Unsquelch(squelch::UnsquelchArgs),
    /// List active squelches.
    Squelches,
    /// Report inactive agents and forgotten squelches as check output.
    MetaCheck(meta_check::MetaCheckArgs),
    /// Show persisted faults.
    Faults(faults::FaultsArgs),
    Version,
}

pub async fn run(opts: crate::Opts) -> Result<()> {
    let mode = opts.output_mode();
    let config = opts.config.as_deref();
    match opts.cmd {
        Commands::Squelch(args) => squelch::add(args, mode, config).await,
        Commands::Unsquelch(args) => squelch::remove(args, mode, config).await,
        Commands::Squelches => squelch::list(mode, config).await,
        Commands::MetaCheck(args) => meta_check::execute(args, config).await,
        Commands::Faults(args) => faults::execute(args, mode, config).await,
        Commands::Version => {
            version::execute(mode);
            Ok(())
        }
    }
}
