//! Per-model popularity snapshot shared by the fetch, table and report stages

use chrono::NaiveDate;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// One model's metrics as observed on one date.
///
/// Natural key is `(date, model_id)`. Field order is the persisted column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub date: NaiveDate,
    pub model_id: String,
    /// Absent in tables written by older author-stats runs
    #[serde(default)]
    pub author: String,
    #[serde(deserialize_with = "deserialize_count")]
    pub likes: u64,
    /// Recent-window download count
    #[serde(deserialize_with = "deserialize_count")]
    pub downloads: u64,
    #[serde(deserialize_with = "deserialize_count")]
    pub downloads_all_time: u64,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub trending_score: f64,
}

impl ModelRecord {
    pub fn key(&self) -> (NaiveDate, &str) {
        (self.date, &self.model_id)
    }
}

/// Author part of a model id: text before the first `/`, or empty.
pub fn author_of(model_id: &str) -> &str {
    model_id.split_once('/').map_or("", |(author, _)| author)
}

/// Deserialize a non-negative count from integer, float or text.
///
/// Dataframe tools write `12.0` once a column has held a NaN; those are
/// accepted. Fractional values are truncated with a warning.
pub fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(CountVisitor)
}

struct CountVisitor;

impl<'de> Visitor<'de> for CountVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a non-negative count")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
        u64::try_from(v).map_err(|_| E::custom(format!("negative count {v}")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<u64, E> {
        count_from_f64(v).ok_or_else(|| E::custom(format!("invalid count {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            log::warn!("empty count field read as 0");
            return Ok(0);
        }
        if let Ok(n) = trimmed.parse::<u64>() {
            return Ok(n);
        }
        let f: f64 = trimmed
            .parse()
            .map_err(|_| E::custom(format!("invalid count {v:?}")))?;
        self.visit_f64(f)
    }

    fn visit_unit<E: de::Error>(self) -> Result<u64, E> {
        Ok(0)
    }
}

/// Deserialize an optional score; an empty cell or null reads as 0.
pub fn deserialize_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ScoreVisitor)
}

struct ScoreVisitor;

impl<'de> Visitor<'de> for ScoreVisitor {
    type Value = f64;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a number or an empty cell")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            return Ok(0.0);
        }
        trimmed
            .parse()
            .map_err(|_| E::custom(format!("invalid score {v:?}")))
    }

    fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
        Ok(0.0)
    }
}

fn count_from_f64(v: f64) -> Option<u64> {
    if !v.is_finite() || v < 0.0 {
        return None;
    }
    if v.fract() != 0.0 {
        log::warn!("non-integral count {v} truncated to {}", v.trunc());
    }
    Some(v.trunc() as u64)
}
