pub mod author;
pub mod delta;
pub mod readme;
pub mod tensors;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use hubstats_core::{Fetcher, HttpTransport, ThreadSleeper};

use crate::config::Config;

/// Fetcher used by the networked subcommands; one client per run
pub fn build_fetcher(config: &Config) -> Result<Fetcher<HttpTransport, ThreadSleeper>> {
    let transport =
        HttpTransport::new(&config.http.settings()).context("Cannot set up HTTP client")?;
    Ok(Fetcher::new(
        transport,
        ThreadSleeper,
        config.http.retry_policy(),
    ))
}

/// Table with a cyan header row
pub fn styled_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

/// Print a key-value summary table on stderr
pub fn print_summary(title: &str, rows: &[(&str, String)]) {
    let mut table = styled_table(&[title, "Value"]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{table}");
}
