// src/ingest/mod.rs
pub mod fetch;
pub mod providers;
pub mod rules;
pub mod types;

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

use crate::ingest::types::{NewsItem, RawItem};
use crate::relevance;

/// Title used when a source omits one.
pub const UNTITLED: &str = "Без заголовка";

/// One-time metrics registration (so series show up on /metrics). Must run
/// after the recorder is installed.
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("news_raw_items_total", "Raw items returned by source adapters.");
        describe_counter!("news_kept_total", "Items kept after filtering and dedup.");
        describe_counter!(
            "news_dropped_total",
            "Items dropped before classification, labelled by reason."
        );
        describe_counter!("news_dedup_total", "Items removed as cross-source duplicates.");
        describe_counter!("news_source_errors_total", "Source fetch/parse failures.");
        describe_counter!("news_fetch_retries_total", "HTTP retries spent by adapters.");
        describe_counter!("news_refresh_total", "Completed cache refreshes.");
        describe_counter!(
            "news_classifier_fallback_total",
            "Remote classification failures answered by keywords."
        );
        describe_counter!("news_geocode_requests_total", "External geocoding calls.");
        describe_histogram!("news_parse_ms", "Source parse time in milliseconds.");
        describe_gauge!(
            "news_cache_last_refresh_ts",
            "Unix ts of the last successful refresh."
        );
        describe_gauge!("news_cache_ttl_secs", "Configured aggregation cache TTL.");
    });
}

/// Normalize text: decode entities, strip tags, fold quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Why an item left the pipeline before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Empty,
    Irrelevant,
    NoLink,
    Stale,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::Empty => "empty",
            DropReason::Irrelevant => "irrelevant",
            DropReason::NoLink => "no_link",
            DropReason::Stale => "stale",
        }
    }
}

/// A raw item that passed relevance, link and freshness checks.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedItem {
    pub source: String,
    pub title: String,
    pub description: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    /// Title and description joined; input for classifier and resolver.
    pub text: String,
}

/// Normalize one raw item and apply the relevance, link and freshness gates.
pub fn prepare(
    raw: RawItem,
    now: DateTime<Utc>,
    max_age: Duration,
) -> Result<PreparedItem, DropReason> {
    let title = raw.title.as_deref().map(normalize_text).unwrap_or_default();
    let description = raw.summary.as_deref().map(normalize_text).unwrap_or_default();
    if title.is_empty() && description.is_empty() {
        return Err(DropReason::Empty);
    }

    let text = format!("{} {}", title, description).trim().to_string();
    if !relevance::is_relevant(&text) {
        return Err(DropReason::Irrelevant);
    }

    let link = raw
        .link
        .as_deref()
        .and_then(usable_link)
        .ok_or(DropReason::NoLink)?;

    let published_at = raw
        .published
        .as_deref()
        .and_then(parse_published)
        .unwrap_or(now);
    if now.signed_duration_since(published_at) > max_age {
        return Err(DropReason::Stale);
    }

    Ok(PreparedItem {
        source: raw.source,
        title: if title.is_empty() {
            UNTITLED.to_string()
        } else {
            title
        },
        description,
        link,
        published_at,
        text,
    })
}

/// Absolute http(s) link or nothing.
fn usable_link(s: &str) -> Option<String> {
    let s = s.trim();
    let parsed = url::Url::parse(s).ok()?;
    matches!(parsed.scheme(), "http" | "https").then(|| parsed.to_string())
}

/// Parse a source timestamp: RFC 2822, RFC 3339, or a naive `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn parse_published(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(s)
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|n| n.and_utc())
        })
}

/// Identity key: link and title, lowercased, all whitespace removed.
pub fn dedup_key(link: &str, title: &str) -> (String, String) {
    fn squash(s: &str) -> String {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    }
    (squash(link), squash(title))
}

/// Stable short id derived from the identity key.
pub fn item_id(link: &str, title: &str) -> String {
    use sha2::{Digest, Sha256};
    let (l, t) = dedup_key(link, title);
    let mut hasher = Sha256::new();
    hasher.update(l.as_bytes());
    hasher.update([0u8]);
    hasher.update(t.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(16);
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Drop later occurrences of the same (link, title) key; first seen wins.
pub fn dedupe(items: Vec<NewsItem>) -> Vec<NewsItem> {
    dedupe_counted(items).0
}

/// Like [`dedupe`], also returning how many items were removed.
pub fn dedupe_counted(items: Vec<NewsItem>) -> (Vec<NewsItem>, usize) {
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(items.len());
    let mut keep = Vec::with_capacity(items.len());
    let mut removed = 0usize;
    for it in items {
        if seen.insert(dedup_key(&it.link, &it.title)) {
            keep.push(it);
        } else {
            removed += 1;
        }
    }
    (keep, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: Option<&str>, link: Option<&str>, published: Option<&str>) -> RawItem {
        RawItem {
            source: "test".into(),
            title: title.map(Into::into),
            summary: Some("Новости Петрозаводска".into()),
            link: link.map(Into::into),
            published: published.map(Into::into),
        }
    }

    #[test]
    fn normalize_text_collapses_ws_and_tags() {
        let s = "  <p>Привет,&nbsp;&nbsp; <b>мир</b></p>  ";
        assert_eq!(normalize_text(s), "Привет, мир");
    }

    #[test]
    fn normalize_text_folds_guillemets() {
        assert_eq!(normalize_text("стадион «Спартак»"), "стадион \"Спартак\"");
    }

    #[test]
    fn missing_link_is_dropped() {
        let now = Utc::now();
        let r = prepare(raw(Some("x"), None, None), now, Duration::days(7));
        assert_eq!(r.unwrap_err(), DropReason::NoLink);
        let r = prepare(raw(Some("x"), Some("#"), None), now, Duration::days(7));
        assert_eq!(r.unwrap_err(), DropReason::NoLink);
    }

    #[test]
    fn missing_title_gets_placeholder_and_date_defaults_to_now() {
        let now = Utc::now();
        let p = prepare(
            raw(None, Some("https://x/1"), Some("not a date")),
            now,
            Duration::days(7),
        )
        .unwrap();
        assert_eq!(p.title, UNTITLED);
        assert_eq!(p.published_at, now);
    }

    #[test]
    fn parses_common_date_formats() {
        assert!(parse_published("Mon, 19 Oct 2026 10:00:00 +0300").is_some());
        assert!(parse_published("2026-10-19T10:00:00+00:00").is_some());
        assert!(parse_published("2026-10-19 10:00:00").is_some());
        assert!(parse_published("вчера").is_none());
    }

    #[test]
    fn dedup_key_ignores_case_and_whitespace() {
        assert_eq!(
            dedup_key("https://x/1", " Пожар  в  городе"),
            dedup_key("HTTPS://X/1", "пожар в городе")
        );
        assert_eq!(item_id("https://x/1", "Пожар"), item_id("https://x/1", "пожар"));
    }
}
