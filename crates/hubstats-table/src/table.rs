//! CSV-backed stats table with keyed upsert

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hubstats_core::ModelRecord;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Ordered rows, unique on `(date, model_id)` after [`upsert`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsTable {
    pub rows: Vec<ModelRecord>,
}

impl StatsTable {
    pub fn new(rows: Vec<ModelRecord>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn read(path: &Path) -> Result<Self> {
        read_csv(path).map(Self::new)
    }

    /// `None` when the file does not exist yet
    pub fn read_if_exists(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::read(path).map(Some)
    }

    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        write_csv_atomic(path, &self.rows)
    }
}

/// Merge `new_rows` into `existing`, newest row winning per `(date, model_id)`.
///
/// Concatenates existing then new rows and keeps the last occurrence of
/// each key at its position; non-conflicting rows keep insertion order.
/// Applying the same `new_rows` again does not change the result.
pub fn upsert(existing: Option<StatsTable>, new_rows: Vec<ModelRecord>) -> StatsTable {
    let Some(existing) = existing else {
        return StatsTable::new(new_rows);
    };

    let mut combined = existing.rows;
    combined.extend(new_rows);

    // scan newest first: the first time a key is seen is the row that wins
    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(combined.len());
        let mut keep = vec![false; combined.len()];
        for (i, row) in combined.iter().enumerate().rev() {
            keep[i] = seen.insert(row.key());
        }
        keep
    };
    let kept = combined
        .into_iter()
        .zip(keep)
        .filter_map(|(row, keep)| keep.then_some(row))
        .collect();
    StatsTable::new(kept)
}

pub(crate) fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    reader
        .deserialize()
        .enumerate()
        .map(|(i, row)| {
            // +2: header line and 1-based numbering
            row.with_context(|| format!("{}: bad row at line {}", path.display(), i + 2))
        })
        .collect()
}

/// Write to `<file>.tmp` next to the target, then rename over it.
pub(crate) fn write_csv_atomic<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let tmp = tmp_path(path);
    {
        let mut writer = csv::Writer::from_path(&tmp)
            .with_context(|| format!("Cannot create {}", tmp.display()))?;
        for row in rows {
            writer
                .serialize(row)
                .with_context(|| format!("Cannot write {}", tmp.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("Cannot flush {}", tmp.display()))?;
    }
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to rename {} → {}", tmp.display(), path.display()))?;
    log::debug!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
