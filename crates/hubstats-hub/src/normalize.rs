//! Raw Hub model object -> flat [`ModelRecord`]

use chrono::NaiveDate;
use hubstats_core::{ModelRecord, author_of};
use serde_json::Value;

/// A normalized record plus the raw fields that had to be defaulted
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub record: ModelRecord,
    /// Raw field names that were absent or not a non-negative number
    pub missing: Vec<&'static str>,
}

/// Flatten one raw model object, stamping it with `fetch_date`.
///
/// Missing counts default to 0 and are listed in [`Normalized::missing`].
/// `trendingScore` is optional and never reported as missing.
pub fn normalize(raw: &Value, fetch_date: NaiveDate) -> Normalized {
    let mut missing = Vec::new();

    let model_id = match raw.get("id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => {
            missing.push("id");
            String::new()
        }
    };
    let mut count = |field: &'static str| {
        count_field(raw, field).unwrap_or_else(|| {
            missing.push(field);
            0
        })
    };
    let likes = count("likes");
    let downloads = count("downloads");
    let downloads_all_time = count("downloadsAllTime");
    let trending_score = raw
        .get("trendingScore")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    Normalized {
        record: ModelRecord {
            date: fetch_date,
            author: author_of(&model_id).to_string(),
            model_id,
            likes,
            downloads,
            downloads_all_time,
            trending_score,
        },
        missing,
    }
}

/// Normalize a batch with one shared fetch date.
///
/// Records with defaulted fields are logged individually at debug level and
/// summarised in a single warning.
pub fn normalize_all(raws: &[Value], fetch_date: NaiveDate) -> Vec<ModelRecord> {
    let mut incomplete = 0usize;
    let records = raws
        .iter()
        .map(|raw| {
            let normalized = normalize(raw, fetch_date);
            if !normalized.missing.is_empty() {
                incomplete += 1;
                log::debug!(
                    "{:?}: defaulted missing fields {}",
                    normalized.record.model_id,
                    normalized.missing.join(", ")
                );
            }
            normalized.record
        })
        .collect();
    if incomplete > 0 {
        log::warn!(
            "{incomplete} of {} records had missing fields (defaulted to 0)",
            raws.len()
        );
    }
    records
}

/// Non-negative count at `field`; floats are truncated
pub(crate) fn count_field(raw: &Value, field: &str) -> Option<u64> {
    let value = raw.get(field)?;
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f.trunc() as u64)
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn full_record() {
        let raw = json!({
            "id": "neuralmagic/Llama-3.1-8B-FP8",
            "likes": 12,
            "downloads": 3400,
            "downloadsAllTime": 98000,
            "trendingScore": 4,
        });
        let n = normalize(&raw, date());
        assert!(n.missing.is_empty());
        assert_eq!(
            n.record,
            ModelRecord {
                date: date(),
                model_id: "neuralmagic/Llama-3.1-8B-FP8".to_string(),
                author: "neuralmagic".to_string(),
                likes: 12,
                downloads: 3400,
                downloads_all_time: 98000,
                trending_score: 4.0,
            }
        );
    }

    #[test]
    fn missing_counts_default_to_zero_and_are_reported() {
        let raw = json!({ "id": "a/b", "likes": 3 });
        let n = normalize(&raw, date());
        assert_eq!(n.record.downloads, 0);
        assert_eq!(n.record.downloads_all_time, 0);
        assert_eq!(n.record.trending_score, 0.0);
        assert_eq!(n.missing, vec!["downloads", "downloadsAllTime"]);
    }

    #[test]
    fn bare_id_has_empty_author() {
        let raw = json!({ "id": "bert-base-uncased", "likes": 1, "downloads": 1, "downloadsAllTime": 1 });
        assert_eq!(normalize(&raw, date()).record.author, "");
    }

    #[test]
    fn missing_id_reported() {
        let n = normalize(&json!({}), date());
        assert_eq!(n.record.model_id, "");
        assert_eq!(n.missing[0], "id");
    }

    #[test]
    fn negative_count_treated_as_missing() {
        let raw = json!({ "id": "a/b", "likes": -5, "downloads": 1, "downloadsAllTime": 1 });
        let n = normalize(&raw, date());
        assert_eq!(n.record.likes, 0);
        assert_eq!(n.missing, vec!["likes"]);
    }

    #[test]
    fn batch_shares_fetch_date() {
        let raws = vec![json!({ "id": "a/x" }), json!({ "id": "b/y" })];
        let records = normalize_all(&raws, date());
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.date == date()));
        assert_eq!(records[1].author, "b");
    }
}
