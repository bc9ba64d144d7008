//! Tensors subcommand - snapshot every model carrying a tag

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::Cell;
use hubstats_core::{ProgressContext, fmt_num};
use hubstats_hub::{Cursor, ModelQuery, Pages, normalize_all};
use hubstats_table::{FetchSummary, StatsTable, upsert};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct TensorsArgs {
    /// Output CSV filename
    #[arg(short, long, default_value = "compressed_tensors_models.csv")]
    pub output: PathBuf,

    /// Tag to list (default from config: compressed-tensors)
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Stop after this many pages
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Models per page
    #[arg(long)]
    pub page_size: Option<u32>,
}

const TOP_N: usize = 10;

pub fn run(args: TensorsArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    // every row of this run carries the start date
    let fetch_date = chrono::Local::now().date_naive();
    let tag = args.tag.unwrap_or_else(|| config.hub.tag.clone());
    let max_pages = args.max_pages.unwrap_or(config.hub.max_pages);
    let page_size = args.page_size.unwrap_or(config.hub.page_size);

    let query = ModelQuery::tagged(&config.hub.base_url, &tag, page_size);
    let start = Cursor::new(query.url().context("Invalid Hub base URL")?);
    let fetcher = super::build_fetcher(config)?;

    log::info!("Fetching all models with {tag} tag...");
    let line = progress.stage_line("fetch");
    let mut raws = Vec::new();
    let mut pages = Pages::new(&fetcher, start, max_pages);
    for page in pages.by_ref() {
        raws.extend(page.records);
        line.set_message(format!(
            "page {}: {} models",
            page.number,
            fmt_num(raws.len() as u64)
        ));
    }
    line.finish_and_clear();
    log::info!(
        "Total models collected: {} ({} pages)",
        raws.len(),
        pages.pages_fetched()
    );

    let new_rows = normalize_all(&raws, fetch_date);
    anyhow::ensure!(!new_rows.is_empty(), "No models found.");

    let existing = StatsTable::read_if_exists(&args.output)?;
    match &existing {
        Some(_) => log::info!("Updating existing file: {}", args.output.display()),
        None => log::info!("Creating new file: {}", args.output.display()),
    }
    let summary = FetchSummary::from_records(&new_rows, TOP_N);
    let merged = upsert(existing, new_rows);
    merged.write_atomic(&args.output)?;

    print_fetch_summary(&tag, &summary, merged.len());
    Ok(())
}

fn print_fetch_summary(tag: &str, summary: &FetchSummary, dataset_rows: usize) {
    super::print_summary(
        &format!("{tag} models"),
        &[
            ("Total models", fmt_num(summary.total_models as u64)),
            ("Unique authors", fmt_num(summary.unique_authors as u64)),
            ("Total likes", fmt_num(summary.total_likes)),
            ("Downloads (30 day)", fmt_num(summary.total_downloads)),
            ("Downloads (all time)", fmt_num(summary.total_downloads_all_time)),
            ("Rows in dataset", fmt_num(dataset_rows as u64)),
        ],
    );

    let mut models = super::styled_table(&["Model", "Author", "Downloads (all time)", "Likes"]);
    for r in &summary.top_models {
        models.add_row(vec![
            Cell::new(&r.model_id),
            Cell::new(&r.author),
            Cell::new(fmt_num(r.downloads_all_time)),
            Cell::new(fmt_num(r.likes)),
        ]);
    }
    eprintln!("\nTop {TOP_N} models by all-time downloads:\n{models}");

    let mut authors = super::styled_table(&["Author", "Downloads (all time)", "Models"]);
    for a in &summary.top_authors {
        authors.add_row(vec![
            Cell::new(&a.author),
            Cell::new(fmt_num(a.downloads_all_time)),
            Cell::new(a.model_count),
        ]);
    }
    eprintln!("\nTop {TOP_N} authors by total downloads:\n{authors}");
}
