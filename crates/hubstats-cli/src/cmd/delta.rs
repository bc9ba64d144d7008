//! Delta subcommand - day-over-day changes per model

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::Cell;
use hubstats_table::{
    StatsTable, compute_deltas, deltas_path, summarize_by_model, totals_by_date, write_deltas,
};

#[derive(Args, Debug)]
pub struct DeltaArgs {
    /// Input CSV file with model stats
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output file (default: <input stem>_with_deltas.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: DeltaArgs) -> Result<()> {
    anyhow::ensure!(
        args.file.exists(),
        "Input file not found: {}",
        args.file.display()
    );

    let table = StatsTable::read(&args.file)?;
    let rows = compute_deltas(&table);
    let output = args.output.unwrap_or_else(|| deltas_path(&args.file));
    write_deltas(&output, &rows)?;
    log::info!("Full data with deltas saved to: {}", output.display());

    let mut by_model = super::styled_table(&["Model", "Sum", "Mean", "Max"]);
    for s in summarize_by_model(&rows) {
        by_model.add_row(vec![
            Cell::new(s.model_id),
            Cell::new(s.sum),
            Cell::new(format!("{:.1}", s.mean)),
            Cell::new(s.max),
        ]);
    }
    eprintln!("\nSummary of daily download deltas by model:\n{by_model}");

    let mut by_date = super::styled_table(&["Date", "Downloads"]);
    for (date, total) in totals_by_date(&rows) {
        by_date.add_row(vec![Cell::new(date), Cell::new(total)]);
    }
    eprintln!("\nTotal downloads by date:\n{by_date}");
    Ok(())
}
