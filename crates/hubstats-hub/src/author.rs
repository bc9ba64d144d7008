//! Per-author listing with all-time download lookups

use chrono::NaiveDate;
use hubstats_core::{Fetch, FetchError, ModelRecord};
use serde_json::Value;

use crate::link::Cursor;
use crate::normalize::{count_field, normalize};
use crate::paginate::{ModelQuery, paginate_all};

/// Detail URL for one model, asking for the all-time download counter
pub fn details_url(base_url: &str, model_id: &str) -> String {
    format!(
        "{}/models/{model_id}?expand[]=downloadsAllTime",
        base_url.trim_end_matches('/')
    )
}

/// Raw listing of every model published by `author`, following pagination.
pub fn list_author_models<F: Fetch + ?Sized>(
    fetcher: &F,
    base_url: &str,
    author: &str,
    max_pages: u32,
) -> Result<Vec<Value>, url::ParseError> {
    let start = Cursor::new(ModelQuery::by_author(base_url, author).url()?);
    Ok(paginate_all(fetcher, start, max_pages))
}

/// All-time downloads for one model; 0 when the field is absent.
pub fn downloads_all_time<F: Fetch + ?Sized>(
    fetcher: &F,
    base_url: &str,
    model_id: &str,
) -> Result<u64, FetchError> {
    let result = fetcher.fetch(&details_url(base_url, model_id))?;
    Ok(count_field(&result.body, "downloadsAllTime").unwrap_or(0))
}

/// Snapshot every model of `author`.
///
/// The listing carries likes and recent downloads; the all-time counter
/// needs one detail request per model. A failed detail request is logged
/// and recorded as 0 so one bad model does not drop the whole listing.
pub fn author_stats<F: Fetch + ?Sized>(
    fetcher: &F,
    base_url: &str,
    author: &str,
    max_pages: u32,
    fetch_date: NaiveDate,
) -> Result<Vec<ModelRecord>, url::ParseError> {
    let raws = list_author_models(fetcher, base_url, author, max_pages)?;

    let mut records = Vec::with_capacity(raws.len());
    for raw in &raws {
        let normalized = normalize(raw, fetch_date);
        let mut record = normalized.record;
        let unexpected: Vec<_> = normalized
            .missing
            .iter()
            .filter(|f| **f != "downloadsAllTime")
            .collect();
        if !unexpected.is_empty() {
            log::warn!("{:?}: missing fields defaulted to 0: {unexpected:?}", record.model_id);
        }

        record.downloads_all_time = match downloads_all_time(fetcher, base_url, &record.model_id) {
            Ok(n) => n,
            Err(e) => {
                log::warn!("{}: all-time downloads unavailable: {e}", record.model_id);
                0
            }
        };
        records.push(record);
    }
    Ok(records)
}
