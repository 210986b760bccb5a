// src/pipeline.rs
//! One aggregation run end to end, and the cached service in front of it.

use std::sync::Arc;

use anyhow::Context;
use futures::future::join_all;
use metrics::counter;
use tracing::{debug, info, warn};

use crate::cache::{AggregationCache, Clock, Lookup, SystemClock};
use crate::classify::Classifier;
use crate::config::classifier::ClassifierConfig;
use crate::config::NewsConfig;
use crate::error::{FetchError, NewsError};
use crate::geo::LocationResolver;
use crate::ingest::fetch::HttpFetcher;
use crate::ingest::providers::{ChannelAdapter, FeedAdapter, PageAdapter};
use crate::ingest::types::{NewsItem, RawItem, SourceAdapter};
use crate::ingest;
use crate::relevance::anon_hash;

/// Build adapters for every configured source. Pages whose rule cannot be
/// resolved are logged and left out.
pub fn build_sources(cfg: &NewsConfig) -> Result<Vec<Arc<dyn SourceAdapter>>, FetchError> {
    let fetcher = HttpFetcher::new(cfg.fetch_policy())?;
    let mut out: Vec<Arc<dyn SourceAdapter>> = Vec::with_capacity(cfg.source_count());

    for d in cfg.feed_descriptors() {
        out.push(Arc::new(FeedAdapter::new(d, fetcher.clone())));
    }
    for (d, rule) in cfg.page_sources() {
        match rule {
            Ok(rule) => out.push(Arc::new(PageAdapter::new(d, rule, fetcher.clone()))),
            Err(e) => warn!(source = %d.name, error = %e, "page source skipped"),
        }
    }
    for (d, layout) in cfg.channel_sources() {
        out.push(Arc::new(ChannelAdapter::new(d, layout, fetcher.clone())));
    }
    Ok(out)
}

pub struct Aggregator {
    sources: Vec<Arc<dyn SourceAdapter>>,
    classifier: Classifier,
    resolver: LocationResolver,
    max_age: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl Aggregator {
    pub fn new(
        sources: Vec<Arc<dyn SourceAdapter>>,
        classifier: Classifier,
        resolver: LocationResolver,
        max_age: chrono::Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sources,
            classifier,
            resolver,
            max_age,
            clock,
        }
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Fetch all sources concurrently, then filter, classify, locate and
    /// dedupe sequentially. Fails only when nothing could be fetched.
    pub async fn run(&self) -> Result<Vec<NewsItem>, NewsError> {
        if self.sources.is_empty() {
            return Err(NewsError::NoSources);
        }

        let raw = self.fetch_all().await?;
        let now = self.clock.now();
        let mut items = Vec::with_capacity(raw.len());

        for r in raw {
            let source = r.source.clone();
            let prepared = match ingest::prepare(r, now, self.max_age) {
                Ok(p) => p,
                Err(reason) => {
                    counter!("news_dropped_total", "reason" => reason.as_str()).increment(1);
                    debug!(%source, reason = reason.as_str(), "item dropped");
                    continue;
                }
            };

            let category = self.classifier.classify(&prepared.text).await;
            let loc = self.resolver.resolve(&prepared.text).await;
            debug!(
                id = %anon_hash(&prepared.text),
                %category,
                place = %loc.place,
                "item kept"
            );

            items.push(NewsItem {
                id: ingest::item_id(&prepared.link, &prepared.title),
                source: prepared.source,
                title: prepared.title,
                description: prepared.description,
                link: prepared.link,
                published_at: prepared.published_at,
                place: loc.place,
                longitude: loc.longitude,
                latitude: loc.latitude,
                category,
            });
        }

        let (items, removed) = ingest::dedupe_counted(items);
        counter!("news_dedup_total").increment(removed as u64);
        counter!("news_kept_total").increment(items.len() as u64);
        counter!("news_refresh_total").increment(1);
        info!(kept = items.len(), duplicates = removed, "aggregation run finished");
        Ok(items)
    }

    async fn fetch_all(&self) -> Result<Vec<RawItem>, NewsError> {
        let results = join_all(self.sources.iter().map(|s| s.fetch())).await;

        let mut raw = Vec::new();
        let mut failed = 0usize;
        for (src, res) in self.sources.iter().zip(results) {
            match res {
                Ok(batch) => {
                    debug!(source = src.name(), count = batch.len(), "source fetched");
                    raw.extend(batch);
                }
                Err(e) => {
                    failed += 1;
                    let d = src.descriptor();
                    counter!(
                        "news_source_errors_total",
                        "source" => d.name.clone(),
                        "kind" => d.kind.as_str()
                    )
                    .increment(1);
                    warn!(
                        source = %d.name,
                        kind = d.kind.as_str(),
                        url = %d.url,
                        error = %e,
                        "source failed, skipping"
                    );
                }
            }
        }

        if failed == self.sources.len() {
            return Err(NewsError::AllSourcesFailed { attempted: failed });
        }
        Ok(raw)
    }
}

/// Cached entry point: `current()` serves the last result while it is fresh.
pub struct NewsService {
    aggregator: Aggregator,
    cache: AggregationCache,
}

impl NewsService {
    pub fn new(aggregator: Aggregator, cache: AggregationCache) -> Self {
        Self { aggregator, cache }
    }

    pub fn from_config(news: &NewsConfig, classifier: &ClassifierConfig) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let sources = build_sources(news).context("building source adapters")?;
        let resolver = LocationResolver::from_config(news).context("building geocoder")?;
        let classifier = Classifier::from_config(classifier);
        info!(
            sources = sources.len(),
            classifier = classifier.remote_provider().unwrap_or("keywords"),
            geocoder = news.pipeline.geocoder_enabled,
            ttl_secs = news.pipeline.cache_ttl_secs,
            "news service configured"
        );
        let aggregator =
            Aggregator::new(sources, classifier, resolver, news.max_age(), clock.clone());
        let cache = AggregationCache::new(news.cache_ttl(), clock);
        Ok(Self::new(aggregator, cache))
    }

    /// Current aggregated result, refreshing it first when stale.
    pub async fn current(&self) -> Result<Lookup, NewsError> {
        self.cache.get_or_refresh(|| self.aggregator.run()).await
    }
}
