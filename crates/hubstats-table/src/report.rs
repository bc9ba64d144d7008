//! README "Latest Stats" section rendering

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::Table;
use comfy_table::presets::ASCII_MARKDOWN;

use crate::table::StatsTable;

/// Heading that owns the rendered table
pub const MARKER: &str = "## Latest Stats";

/// The document has no [`MARKER`] heading to write under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingMarkerError;

impl std::fmt::Display for MissingMarkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not find '{MARKER}' in README")
    }
}

impl std::error::Error for MissingMarkerError {}

/// Markdown pipe table of every row
pub fn render_markdown(table: &StatsTable) -> String {
    let mut out = Table::new();
    out.load_preset(ASCII_MARKDOWN).set_header(vec![
        "date",
        "model_id",
        "author",
        "likes",
        "downloads",
        "downloads_all_time",
        "trending_score",
    ]);
    for r in &table.rows {
        out.add_row(vec![
            r.date.to_string(),
            r.model_id.clone(),
            r.author.clone(),
            r.likes.to_string(),
            r.downloads.to_string(),
            r.downloads_all_time.to_string(),
            r.trending_score.to_string(),
        ]);
    }
    out.to_string()
}

/// Byte offset and text of each line, newline included
fn lines_with_offsets(s: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    s.split_inclusive('\n').map(move |line| {
        let at = offset;
        offset += line.len();
        (at, line)
    })
}

fn is_section_heading(line: &str) -> bool {
    line.starts_with("# ") || line.starts_with("## ")
}

/// Replace the body of the [`MARKER`] section with `table_md`.
///
/// The section runs to the next `#`/`##` heading or end of document;
/// everything outside it is kept byte for byte.
pub fn update_report(content: &str, table_md: &str) -> Result<String, MissingMarkerError> {
    let (marker_at, marker_line) = lines_with_offsets(content)
        .find(|(_, line)| line.trim_end() == MARKER)
        .ok_or(MissingMarkerError)?;
    let body_at = marker_at + marker_line.len();

    let next_heading = lines_with_offsets(&content[body_at..])
        .find(|(_, line)| is_section_heading(line))
        .map(|(at, _)| body_at + at);

    let mut out = String::with_capacity(content.len() + table_md.len());
    out.push_str(content[..body_at].trim_end_matches('\n'));
    out.push_str("\n\n");
    out.push_str(table_md.trim_end());
    out.push('\n');
    if let Some(at) = next_heading {
        out.push('\n');
        out.push_str(&content[at..]);
    }
    Ok(out)
}

/// Render `stats` into the README at `readme`.
///
/// Nothing is written unless the marker is found.
pub fn update_report_file(readme: &Path, stats: &Path) -> Result<()> {
    let content = fs::read_to_string(readme)
        .with_context(|| format!("Cannot read {}", readme.display()))?;
    let table = StatsTable::read(stats)?;

    let updated = update_report(&content, &render_markdown(&table))
        .with_context(|| format!("Cannot update {}", readme.display()))?;

    let mut tmp_name = readme.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = readme.with_file_name(tmp_name);
    fs::write(&tmp, updated).with_context(|| format!("Cannot write {}", tmp.display()))?;
    fs::rename(&tmp, readme)
        .with_context(|| format!("failed to rename {} → {}", tmp.display(), readme.display()))?;
    log::info!("Updated {} with {} rows", readme.display(), table.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use hubstats_core::ModelRecord;

    use super::*;

    const TABLE: &str = "| a |\n|---|\n| 1 |";

    #[test]
    fn missing_marker() {
        assert_eq!(
            update_report("# Title\n\nNo stats here\n", TABLE),
            Err(MissingMarkerError)
        );
    }

    #[test]
    fn marker_must_be_whole_line() {
        assert!(update_report("See ## Latest Stats below\n", TABLE).is_err());
    }

    #[test]
    fn marker_at_end_of_file() {
        let out = update_report("# Title\n\n## Latest Stats\n", TABLE).unwrap();
        assert_eq!(out, "# Title\n\n## Latest Stats\n\n| a |\n|---|\n| 1 |\n");
    }

    #[test]
    fn old_table_replaced_and_following_section_kept() {
        let readme = "# Title\n\n## Latest Stats\n\n| old |\n|-----|\n\n## Usage\n\nrun it\n";
        let out = update_report(readme, TABLE).unwrap();
        assert_eq!(
            out,
            "# Title\n\n## Latest Stats\n\n| a |\n|---|\n| 1 |\n\n## Usage\n\nrun it\n"
        );
    }

    #[test]
    fn update_is_repeatable() {
        let readme = "# T\n\n## Latest Stats\n\n## Usage\n";
        let once = update_report(readme, TABLE).unwrap();
        let twice = update_report(&once, TABLE).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn deeper_headings_stay_in_section() {
        let readme = "## Latest Stats\nold\n### Detail\nold\n## Next\n";
        let out = update_report(readme, TABLE).unwrap();
        assert_eq!(out, "## Latest Stats\n\n| a |\n|---|\n| 1 |\n\n## Next\n");
    }

    #[test]
    fn markdown_has_header_and_rows() {
        let table = StatsTable::new(vec![ModelRecord {
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            model_id: "org/m".to_string(),
            author: "org".to_string(),
            likes: 5,
            downloads: 6,
            downloads_all_time: 7,
            trending_score: 0.0,
        }]);
        let md = render_markdown(&table);
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with('|'));
        assert!(lines[0].contains("model_id"));
        assert!(lines[1].contains("---"));
        assert!(lines[2].contains("org/m"));
        assert!(lines[2].contains("2025-06-01"));
    }
}
