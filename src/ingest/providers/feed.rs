// src/ingest/providers/feed.rs
//! RSS 2.0 / Atom feed adapter.

use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::error::FetchError;
use crate::ingest::fetch::HttpFetcher;
use crate::ingest::types::{RawItem, SourceAdapter, SourceDescriptor};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    /// `<content:encoded>`; quick-xml matches on the local name.
    #[serde(rename = "encoded")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<String>,
    #[serde(rename = "link", default)]
    link: Vec<AtomLink>,
    summary: Option<String>,
    content: Option<String>,
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: String,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

/// Fetches a feed URL and maps its entries to [`RawItem`]s.
pub struct FeedAdapter {
    descriptor: SourceDescriptor,
    fetcher: HttpFetcher,
}

impl FeedAdapter {
    pub fn new(descriptor: SourceDescriptor, fetcher: HttpFetcher) -> Self {
        Self {
            descriptor,
            fetcher,
        }
    }
}

#[async_trait]
impl SourceAdapter for FeedAdapter {
    async fn fetch(&self) -> Result<Vec<RawItem>, FetchError> {
        let body = self.fetcher.get_text(&self.descriptor.url).await?;
        parse_feed(&self.descriptor.name, &body, self.descriptor.max_items)
    }

    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }
}

/// Parse RSS or Atom XML into at most `max_items` raw items, in feed order.
pub fn parse_feed(source: &str, xml: &str, max_items: usize) -> Result<Vec<RawItem>, FetchError> {
    let t0 = std::time::Instant::now();
    let xml_clean = scrub_html_entities_for_xml(xml);

    let out = if xml_clean.contains("<rss") || xml_clean.contains("<channel") {
        let rss: Rss = from_str(&xml_clean)
            .map_err(|e| FetchError::Parse(format!("rss from {source}: {e}")))?;
        rss.channel
            .item
            .into_iter()
            .take(max_items)
            .map(|it| RawItem {
                source: source.to_string(),
                title: it.title,
                summary: it.description.or(it.content),
                link: it.link,
                published: it.pub_date,
            })
            .collect::<Vec<_>>()
    } else if xml_clean.contains("<feed") {
        let feed: AtomFeed = from_str(&xml_clean)
            .map_err(|e| FetchError::Parse(format!("atom from {source}: {e}")))?;
        feed.entry
            .into_iter()
            .take(max_items)
            .map(|e| {
                let link = e
                    .link
                    .iter()
                    .find(|l| l.rel.as_deref().map_or(true, |r| r == "alternate"))
                    .or_else(|| e.link.first())
                    .map(|l| l.href.clone());
                RawItem {
                    source: source.to_string(),
                    title: e.title,
                    summary: e.summary.or(e.content),
                    link,
                    published: e.published.or(e.updated),
                }
            })
            .collect::<Vec<_>>()
    } else {
        return Err(FetchError::Parse(format!("{source}: not an RSS or Atom document")));
    };

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("news_parse_ms").record(ms);
    counter!("news_raw_items_total").increment(out.len() as u64);
    Ok(out)
}

/// HTML entities that are not valid XML but show up in real feeds.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&laquo;", "\"")
        .replace("&raquo;", "\"")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_feed_documents() {
        let err = parse_feed("x", "<html><body>hi</body></html>", 10).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn encoded_body_fills_missing_description() {
        let xml = r#"<rss xmlns:content="http://purl.org/rss/1.0/modules/content/"><channel>
            <item><title>t</title><content:encoded><![CDATA[<p>тело</p>]]></content:encoded></item>
        </channel></rss>"#;
        let items = parse_feed("x", xml, 10).unwrap();
        assert_eq!(items[0].summary.as_deref(), Some("<p>тело</p>"));
    }

    #[test]
    fn scrubs_entities() {
        assert_eq!(scrub_html_entities_for_xml("a&nbsp;&laquo;b&raquo;"), "a \"b\"");
    }
}
