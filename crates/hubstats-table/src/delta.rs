//! Day-over-day deltas per model

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use hubstats_core::ModelRecord;
use serde::{Deserialize, Serialize};

use crate::table::{StatsTable, write_csv_atomic};

/// Stats row plus the change since the same model's previous date.
///
/// `downloads_delta` is taken from the all-time counter, since the recent
/// window count is not cumulative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaRow {
    pub date: NaiveDate,
    pub model_id: String,
    pub author: String,
    pub likes: u64,
    pub downloads: u64,
    pub downloads_all_time: u64,
    pub trending_score: f64,
    pub likes_delta: i64,
    pub downloads_delta: i64,
}

impl DeltaRow {
    fn new(record: &ModelRecord, likes_delta: i64, downloads_delta: i64) -> Self {
        Self {
            date: record.date,
            model_id: record.model_id.clone(),
            author: record.author.clone(),
            likes: record.likes,
            downloads: record.downloads,
            downloads_all_time: record.downloads_all_time,
            trending_score: record.trending_score,
            likes_delta,
            downloads_delta,
        }
    }

    /// The underlying stats row, without the delta columns
    pub fn record(&self) -> ModelRecord {
        ModelRecord {
            date: self.date,
            model_id: self.model_id.clone(),
            author: self.author.clone(),
            likes: self.likes,
            downloads: self.downloads,
            downloads_all_time: self.downloads_all_time,
            trending_score: self.trending_score,
        }
    }
}

fn signed(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Rows sorted by `(model_id, date)` with deltas filled in.
///
/// The first row of each model counts from zero: its deltas equal its raw
/// likes and all-time downloads.
pub fn compute_deltas(table: &StatsTable) -> Vec<DeltaRow> {
    let mut rows: Vec<&ModelRecord> = table.rows.iter().collect();
    rows.sort_by(|a, b| a.model_id.cmp(&b.model_id).then(a.date.cmp(&b.date)));

    let mut out = Vec::with_capacity(rows.len());
    let mut prev: Option<&ModelRecord> = None;
    for row in rows {
        let (likes_before, downloads_before) = match prev {
            Some(p) if p.model_id == row.model_id => (p.likes, p.downloads_all_time),
            _ => (0, 0),
        };
        out.push(DeltaRow::new(
            row,
            signed(row.likes) - signed(likes_before),
            signed(row.downloads_all_time) - signed(downloads_before),
        ));
        prev = Some(row);
    }
    out
}

/// `{stem}_with_deltas.csv` beside the input file
pub fn deltas_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{stem}_with_deltas.csv"))
}

pub fn write_deltas(path: &Path, rows: &[DeltaRow]) -> Result<()> {
    write_csv_atomic(path, rows)
}

/// `downloads_delta` aggregates for one model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDeltaSummary {
    pub model_id: String,
    pub sum: i64,
    pub mean: f64,
    pub max: i64,
}

/// Per-model sum/mean/max of `downloads_delta`, largest sum first.
pub fn summarize_by_model(rows: &[DeltaRow]) -> Vec<ModelDeltaSummary> {
    let mut groups: BTreeMap<&str, Vec<i64>> = BTreeMap::new();
    for row in rows {
        groups
            .entry(row.model_id.as_str())
            .or_default()
            .push(row.downloads_delta);
    }
    let mut summaries: Vec<ModelDeltaSummary> = groups
        .into_iter()
        .map(|(model_id, deltas)| {
            let sum: i64 = deltas.iter().sum();
            ModelDeltaSummary {
                model_id: model_id.to_string(),
                sum,
                mean: sum as f64 / deltas.len() as f64,
                max: deltas.iter().copied().max().unwrap_or(0),
            }
        })
        .collect();
    // stable: ties stay in model_id order
    summaries.sort_by(|a, b| b.sum.cmp(&a.sum));
    summaries
}

/// Total `downloads_delta` per date, oldest first.
pub fn totals_by_date(rows: &[DeltaRow]) -> BTreeMap<NaiveDate, i64> {
    let mut totals = BTreeMap::new();
    for row in rows {
        *totals.entry(row.date).or_insert(0) += row.downloads_delta;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(day: u32, id: &str, likes: u64, all_time: u64) -> ModelRecord {
        ModelRecord {
            date: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
            model_id: id.to_string(),
            author: String::new(),
            likes,
            downloads: 0,
            downloads_all_time: all_time,
            trending_score: 0.0,
        }
    }

    fn likes_deltas(rows: &[DeltaRow], id: &str) -> Vec<i64> {
        rows.iter()
            .filter(|r| r.model_id == id)
            .map(|r| r.likes_delta)
            .collect()
    }

    #[test]
    fn likes_sequence() {
        let table = StatsTable::new(vec![
            row(1, "a/x", 10, 0),
            row(2, "a/x", 15, 0),
            row(3, "a/x", 12, 0),
        ]);
        assert_eq!(likes_deltas(&compute_deltas(&table), "a/x"), vec![10, 5, -3]);
    }

    #[test]
    fn single_row_counts_from_zero() {
        let table = StatsTable::new(vec![row(1, "a/x", 7, 100)]);
        let deltas = compute_deltas(&table);
        assert_eq!(deltas[0].likes_delta, 7);
        assert_eq!(deltas[0].downloads_delta, 100);
    }

    #[test]
    fn unsorted_input_grouped_per_model() {
        let table = StatsTable::new(vec![
            row(3, "b/y", 5, 50),
            row(2, "a/x", 3, 30),
            row(1, "b/y", 1, 10),
            row(1, "a/x", 1, 10),
        ]);
        let deltas = compute_deltas(&table);
        let order: Vec<(&str, i64)> = deltas
            .iter()
            .map(|r| (r.model_id.as_str(), r.downloads_delta))
            .collect();
        assert_eq!(order, vec![("a/x", 10), ("a/x", 20), ("b/y", 10), ("b/y", 40)]);
    }

    #[test]
    fn recomputing_gives_same_deltas() {
        let table = StatsTable::new(vec![
            row(2, "a/x", 15, 200),
            row(1, "a/x", 10, 100),
            row(1, "b/y", 3, 30),
        ]);
        let once = compute_deltas(&table);
        let again = compute_deltas(&StatsTable::new(once.iter().map(DeltaRow::record).collect()));
        assert_eq!(once, again);
    }

    #[test]
    fn deltas_path_replaces_extension() {
        assert_eq!(
            deltas_path(Path::new("data/model_stats.csv")),
            PathBuf::from("data/model_stats_with_deltas.csv")
        );
        assert_eq!(
            deltas_path(Path::new("stats")),
            PathBuf::from("stats_with_deltas.csv")
        );
    }

    #[test]
    fn model_summary_sorted_by_sum() {
        let table = StatsTable::new(vec![
            row(1, "a/x", 0, 10),
            row(2, "a/x", 0, 30),
            row(1, "b/y", 0, 100),
        ]);
        let summary = summarize_by_model(&compute_deltas(&table));
        assert_eq!(summary[0].model_id, "b/y");
        assert_eq!(summary[0].sum, 100);
        assert_eq!(summary[1].model_id, "a/x");
        assert_eq!(summary[1].sum, 30);
        assert_eq!(summary[1].max, 20);
        assert!((summary[1].mean - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn date_totals() {
        let table = StatsTable::new(vec![
            row(1, "a/x", 0, 10),
            row(2, "a/x", 0, 30),
            row(1, "b/y", 0, 100),
        ]);
        let totals = totals_by_date(&compute_deltas(&table));
        let values: Vec<i64> = totals.values().copied().collect();
        assert_eq!(values, vec![110, 20]);
    }
}
