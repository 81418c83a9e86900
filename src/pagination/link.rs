//! Link header cursor extraction
//!
//! Mastodon-compatible servers paginate list endpoints through an
//! RFC 8288 `Link` header:
//!
//! ```text
//! Link: <https://example.social/api/v1/bookmarks?max_id=103>; rel="next",
//!       <https://example.social/api/v1/bookmarks?min_id=110>; rel="prev"
//! ```
//!
//! The `next` link carries the `max_id` used to request older items.

use super::types::Cursor;
use reqwest::header::HeaderMap;
use url::Url;

/// Parsed `Link` header of a paginated response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkHandler {
    raw: String,
    next: Option<String>,
    prev: Option<String>,
}

impl LinkHandler {
    /// Parse a raw `Link` header value
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let next = parse_link_header(&raw, "next");
        let prev = parse_link_header(&raw, "prev");
        Self { raw, next, prev }
    }

    /// Extract the `Link` header from a response, if present
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get("link")
            .and_then(|v| v.to_str().ok())
            .map(Self::parse)
    }

    /// Raw header value
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// URL of the `next` relation
    pub fn next_url(&self) -> Option<&str> {
        self.next.as_deref()
    }

    /// URL of the `prev` relation
    pub fn prev_url(&self) -> Option<&str> {
        self.prev.as_deref()
    }

    /// `max_id` to request the next (older) page
    pub fn max_id(&self) -> Option<String> {
        match &self.next {
            Some(url) => query_value(url, "max_id"),
            // Some servers emit relative or malformed URLs; scan the raw header
            None => scan_param(&self.raw, "max_id"),
        }
    }

    /// `min_id` to request newer items
    pub fn min_id(&self) -> Option<String> {
        self.prev.as_deref().and_then(|url| query_value(url, "min_id"))
    }

    /// `since_id` carried by the `prev` relation, if any
    pub fn since_id(&self) -> Option<String> {
        self.prev
            .as_deref()
            .and_then(|url| query_value(url, "since_id"))
    }

    /// Cursor for the next page
    pub fn next_cursor(&self) -> Option<Cursor> {
        self.max_id().map(Cursor::new)
    }
}

/// Parse a Link header and extract the URL for the given rel
fn parse_link_header(header: &str, target_rel: &str) -> Option<String> {
    // Link header format: <url>; rel="next", <url>; rel="prev"
    for part in header.split(',') {
        let part = part.trim();
        let mut url = None;
        let mut rel = None;

        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(stripped) = segment.strip_prefix("rel=") {
                let rel_value = stripped.trim_matches('"').trim_matches('\'');
                rel = Some(rel_value);
            }
        }

        if let (Some(u), Some(r)) = (url, rel) {
            if r.split_whitespace().any(|candidate| candidate == target_rel) {
                return Some(u.to_string());
            }
        }
    }

    None
}

/// Read a query parameter from an absolute URL, falling back to a raw scan
fn query_value(url: &str, key: &str) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty()),
        Err(_) => scan_param(url, key),
    }
}

/// Find `key=value` anywhere in `text`
fn scan_param(text: &str, key: &str) -> Option<String> {
    let needle = format!("{key}=");
    let mut search = text;
    while let Some(pos) = search.find(&needle) {
        let boundary_ok = pos == 0
            || matches!(
                search.as_bytes()[pos - 1],
                b'?' | b'&' | b'<' | b' ' | b';'
            );
        let rest = &search[pos + needle.len()..];
        if boundary_ok {
            let value: String = rest
                .chars()
                .take_while(|c| !matches!(c, '&' | '>' | ';' | ',' | '"' | ' '))
                .collect();
            if !value.is_empty() {
                return Some(value);
            }
        }
        search = rest;
    }
    None
}
