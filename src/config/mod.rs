// src/config/mod.rs
//! Runtime configuration: `config/news.toml` plus env overrides.

pub mod classifier;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ingest::fetch::FetchPolicy;
use crate::ingest::rules::{builtin_rule, ChannelLayout, ExtractionRule};
use crate::ingest::types::{SourceDescriptor, SourceKind};

pub const DEFAULT_NEWS_CONFIG_PATH: &str = "config/news.toml";
pub const ENV_NEWS_CONFIG_PATH: &str = "NEWS_CONFIG_PATH";
pub const ENV_CACHE_TTL_SECS: &str = "NEWS_CACHE_TTL_SECS";
pub const ENV_GEOCODER_ENABLED: &str = "NEWS_GEOCODER_ENABLED";

pub const DEFAULT_CACHE_TTL_SECS: u64 = 240;
pub const DEFAULT_MAX_AGE_DAYS: i64 = 7;
pub const DEFAULT_MAX_ITEMS: usize = 15;
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub cache_ttl_secs: u64,
    pub max_age_days: i64,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub default_max_items: usize,
    pub geocoder_enabled: bool,
    pub geocoder_url: String,
    pub geocoder_min_interval_ms: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        let fetch = FetchPolicy::default();
        Self {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            user_agent: fetch.user_agent,
            request_timeout_secs: fetch.timeout.as_secs(),
            max_retries: fetch.max_retries,
            retry_delay_ms: fetch.retry_delay.as_millis() as u64,
            default_max_items: DEFAULT_MAX_ITEMS,
            geocoder_enabled: true,
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            geocoder_min_interval_ms: 1_100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceEntry {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub max_items: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageEntry {
    pub name: String,
    pub url: String,
    /// Name of a built-in rule (see `ingest::rules`).
    #[serde(default)]
    pub rule: Option<String>,
    /// Inline selectors; take precedence over `rule`.
    #[serde(default)]
    pub selectors: Option<ExtractionRule>,
    #[serde(default)]
    pub max_items: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelEntry {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub layout: Option<ChannelLayout>,
    #[serde(default)]
    pub max_items: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsConfig {
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub feeds: Vec<SourceEntry>,
    #[serde(default)]
    pub pages: Vec<PageEntry>,
    #[serde(default)]
    pub channels: Vec<ChannelEntry>,
}

impl NewsConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: NewsConfig = toml::from_str(s).context("parsing news config toml")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading news config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// `$NEWS_CONFIG_PATH`, then `config/news.toml`; env overrides applied after.
    pub fn load_default() -> Result<Self> {
        let path = std::env::var(ENV_NEWS_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_NEWS_CONFIG_PATH));
        if !path.exists() {
            return Err(anyhow!("news config not found at {}", path.display()));
        }
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(ttl) = std::env::var(ENV_CACHE_TTL_SECS)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.pipeline.cache_ttl_secs = ttl;
        }
        if let Ok(v) = std::env::var(ENV_GEOCODER_ENABLED) {
            self.pipeline.geocoder_enabled = matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
    }

    fn validate(&self) -> Result<()> {
        let urls = self
            .feeds
            .iter()
            .map(|f| (&f.name, &f.url))
            .chain(self.pages.iter().map(|p| (&p.name, &p.url)))
            .chain(self.channels.iter().map(|c| (&c.name, &c.url)));
        for (name, url) in urls {
            url::Url::parse(url)
                .with_context(|| format!("source {name:?} has invalid url {url:?}"))?;
        }
        if self.pipeline.max_age_days <= 0 {
            return Err(anyhow!("pipeline.max_age_days must be positive"));
        }
        Ok(())
    }

    pub fn source_count(&self) -> usize {
        self.feeds.len() + self.pages.len() + self.channels.len()
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.pipeline.cache_ttl_secs)
    }

    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::days(self.pipeline.max_age_days)
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            user_agent: self.pipeline.user_agent.clone(),
            timeout: Duration::from_secs(self.pipeline.request_timeout_secs.max(1)),
            max_retries: self.pipeline.max_retries,
            retry_delay: Duration::from_millis(self.pipeline.retry_delay_ms),
        }
    }

    fn descriptor(
        &self,
        name: &str,
        url: &str,
        kind: SourceKind,
        max: Option<usize>,
    ) -> SourceDescriptor {
        SourceDescriptor {
            name: name.to_string(),
            url: url.to_string(),
            kind,
            max_items: max.unwrap_or(self.pipeline.default_max_items).max(1),
        }
    }

    pub fn feed_descriptors(&self) -> Vec<SourceDescriptor> {
        self.feeds
            .iter()
            .map(|f| self.descriptor(&f.name, &f.url, SourceKind::Feed, f.max_items))
            .collect()
    }

    /// Page sources with their resolved extraction rule. A page naming an
    /// unknown rule yields `Err` for that entry only.
    pub fn page_sources(&self) -> Vec<(SourceDescriptor, Result<ExtractionRule>)> {
        self.pages
            .iter()
            .map(|p| {
                let d = self.descriptor(&p.name, &p.url, SourceKind::Page, p.max_items);
                let rule = match (&p.selectors, &p.rule) {
                    (Some(sel), _) => Ok(sel.clone()),
                    (None, Some(name)) => builtin_rule(name)
                        .ok_or_else(|| anyhow!("unknown extraction rule {name:?}")),
                    (None, None) => Err(anyhow!("page source {:?} has no rule", p.name)),
                };
                (d, rule)
            })
            .collect()
    }

    pub fn channel_sources(&self) -> Vec<(SourceDescriptor, ChannelLayout)> {
        self.channels
            .iter()
            .map(|c| {
                (
                    self.descriptor(&c.name, &c.url, SourceKind::Channel, c.max_items),
                    c.layout.clone().unwrap_or_default(),
                )
            })
            .collect()
    }
}
