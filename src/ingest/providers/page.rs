// src/ingest/providers/page.rs
//! HTML page adapter driven by a per-source [`ExtractionRule`].

use async_trait::async_trait;
use metrics::{counter, histogram};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::FetchError;
use crate::ingest::fetch::HttpFetcher;
use crate::ingest::rules::ExtractionRule;
use crate::ingest::types::{RawItem, SourceAdapter, SourceDescriptor};

pub struct PageAdapter {
    descriptor: SourceDescriptor,
    rule: ExtractionRule,
    fetcher: HttpFetcher,
}

impl PageAdapter {
    pub fn new(descriptor: SourceDescriptor, rule: ExtractionRule, fetcher: HttpFetcher) -> Self {
        Self {
            descriptor,
            rule,
            fetcher,
        }
    }
}

#[async_trait]
impl SourceAdapter for PageAdapter {
    async fn fetch(&self) -> Result<Vec<RawItem>, FetchError> {
        let body = self.fetcher.get_text(&self.descriptor.url).await?;
        extract_page(&self.descriptor, &self.rule, &body)
    }

    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }
}

pub(crate) fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Parse(format!("bad selector {css:?}: {e:?}")))
}

pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

/// Apply `rule` to an HTML document. Links are resolved against the source URL.
pub fn extract_page(
    descriptor: &SourceDescriptor,
    rule: &ExtractionRule,
    html: &str,
) -> Result<Vec<RawItem>, FetchError> {
    let t0 = std::time::Instant::now();
    let base = Url::parse(&descriptor.url)?;

    let item_sel = selector(&rule.item)?;
    let title_sel = selector(&rule.title)?;
    let link_sel = if rule.link.trim().is_empty() {
        None
    } else {
        Some(selector(&rule.link)?)
    };
    let summary_sel = rule.summary.as_deref().map(selector).transpose()?;
    let date_sel = rule.date.as_deref().map(selector).transpose()?;

    let document = Html::parse_document(html);
    let mut out = Vec::new();

    for item in document.select(&item_sel) {
        if out.len() >= descriptor.max_items {
            break;
        }
        let title_el = item.select(&title_sel).next();
        let title = title_el.map(element_text).filter(|t| !t.trim().is_empty());

        let href = match &link_sel {
            Some(sel) => item.select(sel).next().and_then(|a| a.value().attr("href")),
            None => title_el.and_then(|a| a.value().attr("href")),
        };
        let link = href.and_then(|h| base.join(h).ok()).map(|u| u.to_string());

        let summary = summary_sel
            .as_ref()
            .and_then(|sel| item.select(sel).next())
            .map(element_text)
            .filter(|t| !t.trim().is_empty());

        let published = date_sel
            .as_ref()
            .and_then(|sel| item.select(sel).next())
            .map(|el| {
                el.value()
                    .attr("datetime")
                    .map(str::to_string)
                    .unwrap_or_else(|| element_text(el).trim().to_string())
            });

        if title.is_none() && summary.is_none() {
            debug!(source = %descriptor.name, "page item without title or summary");
            continue;
        }

        out.push(RawItem {
            source: descriptor.name.clone(),
            title,
            summary,
            link,
            published,
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("news_parse_ms").record(ms);
    counter!("news_raw_items_total").increment(out.len() as u64);
    Ok(out)
}
