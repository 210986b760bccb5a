// src/ingest/types.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::Category;
use crate::error::FetchError;

/// Source-native record, consumed once per pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub source: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>, // RFC 2822 / RFC 3339 as found in the source
}

/// Normalized, filtered, classified and geolocated output record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub source: String,
    pub title: String,
    pub description: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub place: String,
    pub longitude: f64,
    pub latitude: f64,
    pub category: Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Feed,
    Page,
    Channel,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Feed => "feed",
            SourceKind::Page => "page",
            SourceKind::Channel => "channel",
        }
    }
}

/// One configured source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub name: String,
    pub url: String,
    pub kind: SourceKind,
    pub max_items: usize,
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Fetch at most `max_items` raw items from this adapter's source.
    async fn fetch(&self) -> Result<Vec<RawItem>, FetchError>;
    fn descriptor(&self) -> &SourceDescriptor;

    fn name(&self) -> &str {
        &self.descriptor().name
    }
}
