// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod geo;
pub mod ingest;
pub mod keywords;
pub mod metrics;
pub mod pipeline;
pub mod relevance;

pub use crate::api::create_router;
pub use crate::error::NewsError;
pub use crate::ingest::types::NewsItem;
pub use crate::pipeline::NewsService;

use tracing::{error, info};

use crate::config::classifier::ClassifierConfig;
use crate::config::NewsConfig;

/// Load both config files and build the cached news service. A broken config
/// is logged and replaced by defaults; reads then report `NoSources`.
pub fn service_from_env() -> anyhow::Result<NewsService> {
    let news = NewsConfig::load_default().unwrap_or_else(|e| {
        error!(error = %format!("{e:#}"), "news config unusable, starting without sources");
        NewsConfig::default()
    });
    let classifier = ClassifierConfig::load_default().unwrap_or_else(|e| {
        error!(error = %format!("{e:#}"), "classifier config unusable, using keywords only");
        ClassifierConfig::default()
    });
    info!(
        feeds = news.feeds.len(),
        pages = news.pages.len(),
        channels = news.channels.len(),
        classifier_enabled = classifier.enabled,
        "configuration loaded"
    );
    NewsService::from_config(&news, &classifier)
}
