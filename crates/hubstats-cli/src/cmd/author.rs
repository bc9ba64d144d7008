//! Author subcommand - snapshot every model published by one author

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::Cell;
use hubstats_core::{ProgressContext, fmt_num};
use hubstats_table::{StatsTable, upsert};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct AuthorArgs {
    /// Hub author (user or organization)
    #[arg(short, long, default_value = "neuralmagic")]
    pub author: String,

    /// Output CSV filename
    #[arg(short, long, default_value = "model_stats.csv")]
    pub output: PathBuf,
}

pub fn run(args: AuthorArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    let fetch_date = chrono::Local::now().date_naive();
    let fetcher = super::build_fetcher(config)?;

    let line = progress.stage_line("author");
    line.set_message(format!("listing models of {}", args.author));
    let records = hubstats_hub::author_stats(
        &fetcher,
        &config.hub.base_url,
        &args.author,
        config.hub.max_pages,
        fetch_date,
    )
    .context("Invalid Hub base URL")?;
    line.finish_and_clear();
    anyhow::ensure!(!records.is_empty(), "No models found for author {}", args.author);

    let mut table = super::styled_table(&["Model", "Likes", "Downloads", "Downloads (all time)"]);
    for r in &records {
        table.add_row(vec![
            Cell::new(&r.model_id),
            Cell::new(fmt_num(r.likes)),
            Cell::new(fmt_num(r.downloads)),
            Cell::new(fmt_num(r.downloads_all_time)),
        ]);
    }

    let count = records.len();
    let merged = upsert(StatsTable::read_if_exists(&args.output)?, records);
    merged.write_atomic(&args.output)?;

    eprintln!("\n{table}");
    log::info!(
        "{count} models of {} saved to {} ({} rows total)",
        args.author,
        args.output.display(),
        merged.len()
    );
    Ok(())
}
