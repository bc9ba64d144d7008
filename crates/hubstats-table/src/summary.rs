//! Aggregates over one fetched batch

use std::collections::{BTreeMap, HashSet};

use hubstats_core::ModelRecord;

/// All-time downloads and model count for one author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorTotal {
    pub author: String,
    pub downloads_all_time: u64,
    pub model_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchSummary {
    pub total_models: usize,
    pub unique_authors: usize,
    pub total_likes: u64,
    pub total_downloads: u64,
    pub total_downloads_all_time: u64,
    /// Most-downloaded models (all-time), largest first
    pub top_models: Vec<ModelRecord>,
    /// Authors by summed all-time downloads, largest first
    pub top_authors: Vec<AuthorTotal>,
}

impl FetchSummary {
    pub fn from_records(records: &[ModelRecord], top_n: usize) -> Self {
        let authors: HashSet<&str> = records.iter().map(|r| r.author.as_str()).collect();

        let mut top_models = records.to_vec();
        top_models.sort_by(|a, b| b.downloads_all_time.cmp(&a.downloads_all_time));
        top_models.truncate(top_n);

        let mut by_author: BTreeMap<&str, AuthorTotal> = BTreeMap::new();
        for r in records {
            let entry = by_author.entry(r.author.as_str()).or_insert_with(|| AuthorTotal {
                author: r.author.clone(),
                downloads_all_time: 0,
                model_count: 0,
            });
            entry.downloads_all_time += r.downloads_all_time;
            entry.model_count += 1;
        }
        // BTreeMap order breaks ties by author name
        let mut top_authors: Vec<AuthorTotal> = by_author.into_values().collect();
        top_authors.sort_by(|a, b| b.downloads_all_time.cmp(&a.downloads_all_time));
        top_authors.truncate(top_n);

        Self {
            total_models: records.len(),
            unique_authors: authors.len(),
            total_likes: records.iter().map(|r| r.likes).sum(),
            total_downloads: records.iter().map(|r| r.downloads).sum(),
            total_downloads_all_time: records.iter().map(|r| r.downloads_all_time).sum(),
            top_models,
            top_authors,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn rec(id: &str, likes: u64, all_time: u64) -> ModelRecord {
        ModelRecord {
            date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            model_id: id.to_string(),
            author: hubstats_core::author_of(id).to_string(),
            likes,
            downloads: likes * 2,
            downloads_all_time: all_time,
            trending_score: 0.0,
        }
    }

    #[test]
    fn totals() {
        let records = vec![rec("a/x", 1, 100), rec("a/y", 2, 50), rec("b/z", 3, 400)];
        let s = FetchSummary::from_records(&records, 10);
        assert_eq!(s.total_models, 3);
        assert_eq!(s.unique_authors, 2);
        assert_eq!(s.total_likes, 6);
        assert_eq!(s.total_downloads, 12);
        assert_eq!(s.total_downloads_all_time, 550);
    }

    #[test]
    fn top_models_and_authors() {
        let records = vec![rec("a/x", 1, 100), rec("a/y", 2, 350), rec("b/z", 3, 400)];
        let s = FetchSummary::from_records(&records, 2);
        let top: Vec<&str> = s.top_models.iter().map(|r| r.model_id.as_str()).collect();
        assert_eq!(top, vec!["b/z", "a/y"]);
        assert_eq!(
            s.top_authors[0],
            AuthorTotal {
                author: "a".to_string(),
                downloads_all_time: 450,
                model_count: 2
            }
        );
        assert_eq!(s.top_authors[1].author, "b");
    }

    #[test]
    fn empty_batch() {
        let s = FetchSummary::from_records(&[], 10);
        assert_eq!(s.total_models, 0);
        assert!(s.top_models.is_empty());
        assert!(s.top_authors.is_empty());
    }
}
