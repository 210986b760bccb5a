// src/relevance.rs
//! Relevance gate: does a piece of text concern the region?
//!
//! Case-insensitive containment of [`keywords::region_keywords`], each keyword
//! anchored at a word start. Pure functions, no I/O; the keyword patterns are
//! compiled once.

use once_cell::sync::OnceCell;
use regex::Regex;
use tracing::debug;

use crate::keywords::{self, City};

/// Region and city keywords compiled to `\b(?:kw)`, in table order.
fn keyword_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceCell<Vec<(&'static str, Regex)>> = OnceCell::new();
    PATTERNS.get_or_init(|| {
        keywords::region_keywords()
            .map(|kw| (kw, Regex::new(&format!(r"\b(?:{kw})")).unwrap()))
            .collect()
    })
}

fn keyword_hit(kw: &str, lower: &str) -> bool {
    keyword_patterns()
        .iter()
        .find(|(k, _)| *k == kw)
        .is_some_and(|(_, re)| re.is_match(lower))
}

/// Short anonymized id for log lines. Raw item text is never logged at info level.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// True when `text` mentions the region, one of its districts or a known town.
pub fn is_relevant(text: &str) -> bool {
    let t = text.trim();
    if t.is_empty() {
        return false;
    }
    let lower = t.to_lowercase();
    let hit = keyword_patterns()
        .iter()
        .find(|(_, re)| re.is_match(&lower))
        .map(|(kw, _)| *kw);
    match hit {
        Some(kw) => {
            debug!(target: "relevance", id = %anon_hash(t), keyword = kw, "relevant");
            true
        }
        None => {
            debug!(target: "relevance", id = %anon_hash(t), "not relevant");
            false
        }
    }
}

/// Every region keyword found in `text`, in table order. Diagnostics only.
pub fn matched_keywords(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    keyword_patterns()
        .iter()
        .filter(|(_, re)| re.is_match(&lower))
        .map(|(kw, _)| *kw)
        .collect()
}

/// First city from the fixed list mentioned in `text`, if any.
///
/// Uses the same keyword patterns as [`is_relevant`]; list order decides ties.
pub fn detect_city(text: &str) -> Option<&'static City> {
    let lower = text.to_lowercase();
    keywords::CITIES
        .iter()
        .find(|c| c.keywords.iter().any(|kw| keyword_hit(kw, &lower)))
}
