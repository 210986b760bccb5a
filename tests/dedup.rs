// tests/dedup.rs
//
// Cross-source duplicate removal on the (link, title) identity key.

use chrono::{TimeZone, Utc};
use karelia_news::classify::Category;
use karelia_news::ingest::{dedupe, dedupe_counted};
use karelia_news::NewsItem;

fn item(source: &str, link: &str, title: &str) -> NewsItem {
    NewsItem {
        id: karelia_news::ingest::item_id(link, title),
        source: source.into(),
        title: title.into(),
        description: String::new(),
        link: link.into(),
        published_at: Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap(),
        place: "Петрозаводск".into(),
        longitude: 34.3469,
        latitude: 61.7849,
        category: Category::Other,
    }
}

#[test]
fn case_variants_collapse_to_first_seen() {
    let items = vec![
        item("a", "https://x/1", "Пожар"),
        item("b", "https://x/1", "пожар"),
    ];
    let out = dedupe(items);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].source, "a");
}

#[test]
fn whitespace_is_ignored_in_both_fields() {
    let items = vec![
        item("a", "https://x/2", "Мост  через Лососинку"),
        item("b", " https://x/2 ", "Мост через\tЛососинку"),
        item("c", "https://x/2", "Мост через Шую"),
    ];
    let (out, removed) = dedupe_counted(items);
    assert_eq!(removed, 1);
    let sources: Vec<_> = out.iter().map(|i| i.source.as_str()).collect();
    assert_eq!(sources, ["a", "c"]);
}

#[test]
fn same_title_different_link_is_kept() {
    let items = vec![
        item("a", "https://x/3", "Новости"),
        item("b", "https://y/3", "Новости"),
    ];
    assert_eq!(dedupe(items).len(), 2);
}

#[test]
fn dedupe_is_idempotent() {
    let items = vec![
        item("a", "https://x/1", "Пожар"),
        item("b", "https://x/1", "ПОЖАР"),
        item("c", "https://x/4", "Матч"),
        item("d", "https://x/4", "Матч"),
        item("e", "https://x/5", "Выставка"),
    ];
    let once = dedupe(items);
    let twice = dedupe(once.clone());
    assert_eq!(once, twice);
    assert_eq!(once.len(), 3);
}

#[test]
fn id_follows_identity_key() {
    assert_eq!(
        karelia_news::ingest::item_id("https://x/1", "Пожар"),
        karelia_news::ingest::item_id("HTTPS://X/1", " пожар ")
    );
    assert_ne!(
        karelia_news::ingest::item_id("https://x/1", "Пожар"),
        karelia_news::ingest::item_id("https://x/2", "Пожар")
    );
}
