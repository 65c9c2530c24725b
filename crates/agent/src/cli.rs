use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "vigil-agent", version, about = "Run monitoring checks and raise alerts")]
pub struct Args {
    /// Agent configuration file
    pub config: PathBuf,

    /// Number of ticks to perform (default: until interrupted)
    #[arg(short = 'n', long)]
    pub count: Option<u64>,
}
