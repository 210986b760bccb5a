// tests/providers_feed.rs
//
// Feed parsing against fixtures, and the fetch retry budget against a local
// HTTP server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::get, Router};

use karelia_news::error::FetchError;
use karelia_news::ingest::fetch::{FetchPolicy, HttpFetcher};
use karelia_news::ingest::providers::feed::parse_feed;
use karelia_news::ingest::providers::FeedAdapter;
use karelia_news::ingest::types::{SourceAdapter, SourceDescriptor, SourceKind};

const RSS: &str = include_str!("fixtures/karelia_rss.xml");
const ATOM: &str = include_str!("fixtures/atom.xml");

#[test]
fn rss_fixture_parses_in_feed_order() {
    let items = parse_feed("karelia.news", RSS, 10).expect("rss parses");
    assert_eq!(items.len(), 5);

    let first = &items[0];
    assert_eq!(first.source, "karelia.news");
    assert_eq!(
        first.title.as_deref(),
        Some("В Петрозаводске открыли мост через Лососинку")
    );
    assert_eq!(first.link.as_deref(), Some("https://karelia.news/news/1001"));
    assert_eq!(first.published.as_deref(), Some("Sun, 18 Oct 2026 09:00:00 +0300"));
    assert!(first.summary.as_deref().unwrap_or_default().contains("ул. Ленина"));

    assert!(items[3].link.is_none());
}

#[test]
fn content_encoded_is_used_when_description_is_absent() {
    let items = parse_feed("karelia.news", RSS, 10).unwrap();
    let body = items[4].summary.as_deref().expect("content:encoded body");
    assert!(body.contains("В Беломорске открыли новую библиотеку."));
}

#[test]
fn items_interleaved_with_other_elements_all_parse() {
    let xml = r#"<rss version="2.0"><channel>
        <title>Лента</title>
        <item><title>Первая</title><link>https://k.example/1</link></item>
        <image><url>https://k.example/logo.png</url></image>
        <item><title>Вторая</title><link>https://k.example/2</link></item>
        <lastBuildDate>Sun, 18 Oct 2026 09:00:00 +0300</lastBuildDate>
        <item><title>Третья</title><link>https://k.example/3</link></item>
    </channel></rss>"#;
    let items = parse_feed("k", xml, 10).expect("interleaved channel parses");
    let titles: Vec<_> = items.iter().filter_map(|i| i.title.as_deref()).collect();
    assert_eq!(titles, ["Первая", "Вторая", "Третья"]);
}

#[test]
fn max_items_caps_the_feed() {
    let items = parse_feed("karelia.news", RSS, 2).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].link.as_deref(), Some("https://karelia.news/news/1002"));
}

#[test]
fn atom_fixture_prefers_alternate_links() {
    let items = parse_feed("onego", ATOM, 10).expect("atom parses");
    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0].link.as_deref(),
        Some("https://onego.example/news/sortavala-fest")
    );
    assert_eq!(items[0].published.as_deref(), Some("2026-10-18T08:00:00Z"));
    assert_eq!(items[1].published.as_deref(), Some("2026-10-17T15:00:00Z"));
    assert_eq!(
        items[1].summary.as_deref(),
        Some("Открылась выставка петроглифов.")
    );
}

#[test]
fn garbage_is_a_parse_error() {
    assert!(matches!(
        parse_feed("x", "<rss><channel><item>", 10),
        Err(FetchError::Parse(_))
    ));
}

#[derive(Clone)]
struct Flaky {
    hits: Arc<AtomicUsize>,
    fail_first: usize,
}

async fn flaky_rss(State(s): State<Flaky>) -> (StatusCode, String) {
    let n = s.hits.fetch_add(1, Ordering::SeqCst);
    if n < s.fail_first {
        (StatusCode::SERVICE_UNAVAILABLE, "busy".into())
    } else {
        (StatusCode::OK, RSS.to_string())
    }
}

async fn serve(fail_first: usize) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new().route("/rss", get(flaky_rss)).with_state(Flaky {
        hits: hits.clone(),
        fail_first,
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/rss"), hits)
}

fn adapter(url: String) -> FeedAdapter {
    let policy = FetchPolicy {
        retry_delay: Duration::from_millis(10),
        timeout: Duration::from_secs(5),
        ..FetchPolicy::default()
    };
    let d = SourceDescriptor {
        name: "local".into(),
        url,
        kind: SourceKind::Feed,
        max_items: 10,
    };
    FeedAdapter::new(d, HttpFetcher::new(policy).unwrap())
}

#[tokio::test]
async fn transient_failures_are_retried() {
    let (url, hits) = serve(2).await;
    let items = adapter(url).fetch().await.expect("third attempt succeeds");
    assert_eq!(items.len(), 5);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_budget_is_bounded() {
    let (url, hits) = serve(usize::MAX).await;
    let err = adapter(url).fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 503, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}
