//! Domain records returned by statuses list endpoints

use chrono::{DateTime, Utc};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap()
});

/// Items with a stable server-assigned identifier
pub trait Identified {
    /// Server-assigned id
    fn id(&self) -> &str;
}

/// Author of a status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub username: String,
    /// `user` for local accounts, `user@domain` for remote ones
    pub acct: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl Account {
    /// Display name, falling back to the handle when empty
    pub fn name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.acct
        } else {
            &self.display_name
        }
    }
}

/// A post on the social network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub account: Account,
    /// HTML body
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub spoiler_text: String,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default)]
    pub replies_count: u64,
    #[serde(default)]
    pub reblogs_count: u64,
    #[serde(default)]
    pub favourites_count: u64,
    #[serde(default)]
    pub favourited: Option<bool>,
    #[serde(default)]
    pub reblogged: Option<bool>,
    #[serde(default)]
    pub bookmarked: Option<bool>,
    /// Boosted status, when this status is a reblog
    #[serde(default)]
    pub reblog: Option<Box<Status>>,
}

impl Status {
    /// The status whose content is displayed (the boosted one for reblogs)
    pub fn displayed(&self) -> &Status {
        self.reblog.as_deref().unwrap_or(self)
    }

    /// Content with HTML tags stripped and common entities decoded
    pub fn plain_text(&self) -> String {
        let html = &self.displayed().content;
        let mut out = String::with_capacity(html.len());
        let mut in_tag = false;
        let mut tag = String::new();

        for c in html.chars() {
            match (c, in_tag) {
                ('<', false) => {
                    in_tag = true;
                    tag.clear();
                }
                ('>', true) => {
                    in_tag = false;
                    let name = tag.trim_start_matches('/');
                    if (name.starts_with("br") || tag.starts_with("/p")) && !out.ends_with('\n') {
                        out.push('\n');
                    }
                }
                (_, true) => tag.push(c),
                (_, false) => out.push(c),
            }
        }

        decode_entities(out.trim_end())
    }
}

/// Decode character references in one left-to-right pass
///
/// Unknown named entities are kept verbatim.
fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => name
                    .strip_prefix("#x")
                    .or_else(|| name.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| name.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(std::result::Result::ok)
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

impl Identified for Status {
    fn id(&self) -> &str {
        &self.id
    }
}
