//! Link-header pagination over the model listing endpoint

use std::iter::FusedIterator;

use hubstats_core::Fetch;
use serde_json::Value;
use url::Url;

use crate::link::Cursor;

/// Safety ceiling on pages fetched in one listing
pub const DEFAULT_MAX_PAGES: u32 = 50;

/// Page size requested from the listing endpoint
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Query against `{base}/models`
#[derive(Debug, Clone)]
pub struct ModelQuery {
    pub base_url: String,
    /// Tag filter, e.g. `compressed-tensors`
    pub filter: Option<String>,
    pub author: Option<String>,
    /// Extra fields requested per model (`expand=...`, repeated)
    pub expand: Vec<String>,
    pub limit: Option<u32>,
}

impl ModelQuery {
    /// Models carrying `tag`, with recent and all-time downloads expanded
    pub fn tagged(base_url: &str, tag: &str, limit: u32) -> Self {
        Self {
            base_url: base_url.to_string(),
            filter: Some(tag.to_string()),
            author: None,
            expand: vec!["downloads".to_string(), "downloadsAllTime".to_string()],
            limit: Some(limit),
        }
    }

    /// Models published by `author`
    pub fn by_author(base_url: &str, author: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            filter: None,
            author: Some(author.to_string()),
            expand: Vec::new(),
            limit: None,
        }
    }

    /// First-page URL
    pub fn url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("{}/models", self.base_url.trim_end_matches('/')))?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(author) = &self.author {
                pairs.append_pair("author", author);
            }
            if let Some(filter) = &self.filter {
                pairs.append_pair("filter", filter);
            }
            for field in &self.expand {
                pairs.append_pair("expand", field);
            }
            if let Some(limit) = self.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        Ok(url)
    }
}

/// One fetched page of raw model objects
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based
    pub number: u32,
    pub records: Vec<Value>,
}

/// Lazy sequence of pages, following `rel="next"` until absent.
///
/// Ends early (logging why) on the page ceiling, on a fetch error, or on a
/// body that is not a JSON array; pages already yielded are kept. Once
/// finished it stays finished.
pub struct Pages<'a, F: ?Sized> {
    fetcher: &'a F,
    next: Option<Cursor>,
    page: u32,
    max_pages: u32,
}

impl<'a, F: Fetch + ?Sized> Pages<'a, F> {
    /// `max_pages` below 1 is treated as 1.
    pub fn new(fetcher: &'a F, start: Cursor, max_pages: u32) -> Self {
        Self {
            fetcher,
            next: Some(start),
            page: 0,
            max_pages: max_pages.max(1),
        }
    }

    /// Pages fetched so far
    pub fn pages_fetched(&self) -> u32 {
        self.page
    }
}

impl<F: Fetch + ?Sized> Iterator for Pages<'_, F> {
    type Item = Page;

    fn next(&mut self) -> Option<Page> {
        let cursor = self.next.take()?;
        self.page += 1;
        let page = self.page;
        log::info!("Fetching page {page}: {}", cursor.url());

        let result = match self.fetcher.fetch(cursor.url()) {
            Ok(result) => result,
            Err(e) => {
                log::error!("Error fetching page {page}: {e}");
                return None;
            }
        };

        let records = match result.body {
            Value::Array(records) => records,
            other => {
                log::error!("Page {page}: expected a JSON array, got {}", json_kind(&other));
                return None;
            }
        };
        log::info!("Found {} models on page {page}", records.len());

        match Cursor::from_headers(&result.headers) {
            Some(_) if page >= self.max_pages => {
                log::warn!("Reached maximum page limit ({})", self.max_pages);
            }
            Some(next) => self.next = Some(next),
            None => log::info!("No more pages found. Finished at page {page}"),
        }

        Some(Page {
            number: page,
            records,
        })
    }
}

impl<F: Fetch + ?Sized> FusedIterator for Pages<'_, F> {}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Drain every page of a listing into one vector of raw records.
pub fn paginate_all<F: Fetch + ?Sized>(fetcher: &F, start: Cursor, max_pages: u32) -> Vec<Value> {
    let records: Vec<Value> = Pages::new(fetcher, start, max_pages)
        .flat_map(|page| page.records)
        .collect();
    log::info!("Total models collected: {}", records.len());
    records
}
