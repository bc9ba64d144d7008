//! Readme subcommand - render the stats table into README.md

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct ReadmeArgs {
    /// README to update
    #[arg(long, default_value = "README.md")]
    pub readme: PathBuf,

    /// Stats CSV to render
    #[arg(long, default_value = "model_stats.csv")]
    pub stats: PathBuf,
}

pub fn run(args: ReadmeArgs) -> Result<()> {
    hubstats_table::update_report_file(&args.readme, &args.stats)
}
