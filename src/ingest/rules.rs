// src/ingest/rules.rs
//! Extraction rules for scraped sources, registered by name.
//!
//! A page source in `config/news.toml` names its rule (`rule = "stolica-onego"`);
//! the rule itself is data here, not a code branch.

use serde::Deserialize;

/// CSS selectors that yield title/link/summary per listed item.
///
/// `item` selects one element per news entry; the other selectors are evaluated
/// inside it. An empty `link` selector means "use the title element's href".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractionRule {
    pub item: String,
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub summary: Option<String>,
    /// Element carrying a timestamp, read from `datetime` attribute or text.
    #[serde(default)]
    pub date: Option<String>,
}

/// Message-archive page layout (public channel preview pages).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelLayout {
    pub message: String,
    pub text: String,
    pub permalink: String,
    pub time: String,
}

impl Default for ChannelLayout {
    fn default() -> Self {
        Self {
            message: ".tgme_widget_message".to_string(),
            text: ".tgme_widget_message_text".to_string(),
            permalink: "a.tgme_widget_message_date".to_string(),
            time: "time[datetime]".to_string(),
        }
    }
}

/// A registered rule in borrowed form.
struct BuiltinRule {
    name: &'static str,
    item: &'static str,
    title: &'static str,
    link: &'static str,
    summary: Option<&'static str>,
    date: Option<&'static str>,
}

impl BuiltinRule {
    fn to_rule(&self) -> ExtractionRule {
        ExtractionRule {
            item: self.item.to_string(),
            title: self.title.to_string(),
            link: self.link.to_string(),
            summary: self.summary.map(str::to_string),
            date: self.date.map(str::to_string),
        }
    }
}

/// Built-in rules, keyed by source rule name.
const BUILTIN_RULES: &[BuiltinRule] = &[
    BuiltinRule {
        name: "stolica-onego",
        item: ".news-list .news-item",
        title: ".news-item__title a",
        link: "",
        summary: Some(".news-item__lead"),
        date: Some("time"),
    },
    BuiltinRule {
        name: "gov-karelia",
        item: ".news_list .news_item",
        title: ".news_title a",
        link: "",
        summary: Some(".news_anons"),
        date: Some(".news_date"),
    },
];

pub fn builtin_rule(name: &str) -> Option<ExtractionRule> {
    BUILTIN_RULES
        .iter()
        .find(|r| r.name == name)
        .map(BuiltinRule::to_rule)
}

/// Names of every registered rule, in registration order.
pub fn builtin_rule_names() -> impl Iterator<Item = &'static str> {
    BUILTIN_RULES.iter().map(|r| r.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_rules_resolve() {
        for name in builtin_rule_names() {
            let r = builtin_rule(name).unwrap_or_else(|| panic!("rule {name}"));
            assert!(!r.item.is_empty());
            assert!(!r.title.is_empty());
        }
        assert!(builtin_rule("nope").is_none());
    }

    #[test]
    fn default_channel_layout_targets_message_preview() {
        let l = ChannelLayout::default();
        assert!(l.message.contains("message"));
        assert!(l.time.contains("datetime"));
    }
}
