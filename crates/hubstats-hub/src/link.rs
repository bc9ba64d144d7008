//! `Link` response header parsing and the next-page cursor

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, LINK};

/// Parse `<url>; rel="next", <url>; rel="last"` into `rel -> url`.
///
/// Entries without a `<...>` target or a `rel` parameter are skipped.
pub fn parse_link_header(value: &str) -> BTreeMap<String, String> {
    let mut links = BTreeMap::new();
    for entry in value.split(',') {
        let mut parts = entry.split(';');
        let Some(target) = parts.next().map(str::trim) else {
            continue;
        };
        let Some(url) = target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
        else {
            continue;
        };
        let rel = parts.find_map(|param| {
            let (name, value) = param.trim().split_once('=')?;
            (name.trim() == "rel").then(|| value.trim().trim_matches('"'))
        });
        if let Some(rel) = rel {
            links.insert(rel.to_string(), url.to_string());
        }
    }
    links
}

/// Opaque position in a paginated listing: the URL of the page to fetch next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn url(&self) -> &str {
        &self.0
    }

    /// Cursor for the `rel="next"` entry of the response's `Link` header(s)
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(LINK)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| parse_link_header(v).remove("next"))
            .map(Self)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    #[test]
    fn next_and_last() {
        let links = parse_link_header(
            r#"<https://hub.test/api/models?cursor=abc>; rel="next", <https://hub.test/api/models?cursor=zzz>; rel="last""#,
        );
        assert_eq!(links["next"], "https://hub.test/api/models?cursor=abc");
        assert_eq!(links["last"], "https://hub.test/api/models?cursor=zzz");
    }

    #[test]
    fn unquoted_rel() {
        let links = parse_link_header("<https://hub.test/p2>; rel=next");
        assert_eq!(links["next"], "https://hub.test/p2");
    }

    #[test]
    fn malformed_entries_skipped() {
        let links = parse_link_header(r#"https://hub.test/p2; rel="next", <https://hub.test/p9>"#);
        assert!(links.is_empty());
    }

    #[test]
    fn empty_header() {
        assert!(parse_link_header("").is_empty());
    }

    #[test]
    fn cursor_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Link",
            HeaderValue::from_static(r#"<https://hub.test/p2>; rel="next""#),
        );
        assert_eq!(
            Cursor::from_headers(&headers),
            Some(Cursor::new("https://hub.test/p2"))
        );
    }

    #[test]
    fn cursor_absent_without_next() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(r#"<https://hub.test/p1>; rel="prev""#),
        );
        assert_eq!(Cursor::from_headers(&headers), None);
        assert_eq!(Cursor::from_headers(&HeaderMap::new()), None);
    }
}
