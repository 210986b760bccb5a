// src/ingest/providers/channel.rs
//! Public message-archive adapter (channel preview pages such as `t.me/s/<name>`).
//!
//! Messages have no titles. The text is cut to [`PREVIEW_CHARS`] and the title is
//! synthesized from the preview.

use async_trait::async_trait;
use metrics::{counter, histogram};
use scraper::Html;
use url::Url;

use crate::error::FetchError;
use crate::ingest::fetch::HttpFetcher;
use crate::ingest::normalize_text;
use crate::ingest::providers::page::{element_text, selector};
use crate::ingest::rules::ChannelLayout;
use crate::ingest::types::{RawItem, SourceAdapter, SourceDescriptor};

/// Maximum characters kept from a message body.
pub const PREVIEW_CHARS: usize = 280;
/// Maximum characters of a synthesized title.
pub const TITLE_CHARS: usize = 100;

pub struct ChannelAdapter {
    descriptor: SourceDescriptor,
    layout: ChannelLayout,
    fetcher: HttpFetcher,
}

impl ChannelAdapter {
    pub fn new(descriptor: SourceDescriptor, layout: ChannelLayout, fetcher: HttpFetcher) -> Self {
        Self {
            descriptor,
            layout,
            fetcher,
        }
    }
}

#[async_trait]
impl SourceAdapter for ChannelAdapter {
    async fn fetch(&self) -> Result<Vec<RawItem>, FetchError> {
        let body = self.fetcher.get_text(&self.descriptor.url).await?;
        extract_channel(&self.descriptor, &self.layout, &body)
    }

    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }
}

/// Cut `text` to `max` chars on a char boundary, appending an ellipsis when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out = out.trim_end().to_string();
    out.push('…');
    out
}

/// First sentence of the preview, capped at [`TITLE_CHARS`].
pub fn synthesize_title(preview: &str) -> String {
    let end = preview
        .char_indices()
        .find(|&(_, c)| matches!(c, '.' | '!' | '?' | '\n'))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(preview.len());
    let sentence = preview[..end].trim().trim_end_matches('.');
    truncate_chars(sentence, TITLE_CHARS)
}

/// Extract messages from a channel archive page. Newest messages come last on
/// these pages, so the most recent `max_items` are returned, newest first.
pub fn extract_channel(
    descriptor: &SourceDescriptor,
    layout: &ChannelLayout,
    html: &str,
) -> Result<Vec<RawItem>, FetchError> {
    let t0 = std::time::Instant::now();
    let base = Url::parse(&descriptor.url)?;

    let msg_sel = selector(&layout.message)?;
    let text_sel = selector(&layout.text)?;
    let link_sel = selector(&layout.permalink)?;
    let time_sel = selector(&layout.time)?;

    let document = Html::parse_document(html);
    let mut out = Vec::new();

    for msg in document.select(&msg_sel).collect::<Vec<_>>().into_iter().rev() {
        if out.len() >= descriptor.max_items {
            break;
        }
        let Some(text_el) = msg.select(&text_sel).next() else {
            continue; // media-only post
        };
        let text = normalize_text(&element_text(text_el));
        if text.is_empty() {
            continue;
        }
        let preview = truncate_chars(&text, PREVIEW_CHARS);
        let title = synthesize_title(&preview);

        let link = msg
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|h| base.join(h).ok())
            .map(|u| u.to_string());
        let published = msg
            .select(&time_sel)
            .next()
            .and_then(|t| t.value().attr("datetime"))
            .map(str::to_string);

        out.push(RawItem {
            source: descriptor.name.clone(),
            title: Some(title),
            summary: Some(preview),
            link,
            published,
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("news_parse_ms").record(ms);
    counter!("news_raw_items_total").increment(out.len() as u64);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "Кондопога".repeat(50);
        let t = truncate_chars(&s, 20);
        assert_eq!(t.chars().count(), 20);
        assert!(t.ends_with('…'));
        assert_eq!(truncate_chars("коротко", 20), "коротко");
    }

    #[test]
    fn title_is_first_sentence() {
        assert_eq!(
            synthesize_title("В Сегеже открыли мост. Движение запущено."),
            "В Сегеже открыли мост"
        );
        let long = "а".repeat(300);
        assert_eq!(synthesize_title(&long).chars().count(), TITLE_CHARS);
    }
}
