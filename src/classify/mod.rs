// src/classify/mod.rs
//! Two-tier topical classifier.
//!
//! The remote tier (optional) asks an external zero-shot model for a label and
//! maps it through [`LABEL_TABLE`]. Any failure there falls through to the
//! keyword tier, which always answers.

pub mod remote;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::classifier::ClassifierConfig;
use crate::error::ClassifyError;
use crate::keywords::CATEGORY_RULES;
use remote::DynLabelClient;

/// Upper bound on text sent to the remote classifier (chars).
pub const REMOTE_SNIPPET_CHARS: usize = 512;
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Politics,
    Crime,
    Culture,
    Economy,
    Sports,
    Science,
    Accidents,
    Infrastructure,
    Other,
}

impl Category {
    /// All categories in precedence order, catch-all last.
    pub const ALL: [Category; 9] = [
        Category::Politics,
        Category::Crime,
        Category::Culture,
        Category::Economy,
        Category::Sports,
        Category::Science,
        Category::Accidents,
        Category::Infrastructure,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Politics => "politics",
            Category::Crime => "crime",
            Category::Culture => "culture",
            Category::Economy => "economy",
            Category::Sports => "sports",
            Category::Science => "science",
            Category::Accidents => "accidents",
            Category::Infrastructure => "infrastructure",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// Remote label → category. Candidate labels sent to the model are the Russian
/// column; English labels are accepted from models that answer in English.
pub const LABEL_TABLE: &[(&str, Category)] = &[
    ("политика", Category::Politics),
    ("криминал", Category::Crime),
    ("культура", Category::Culture),
    ("экономика", Category::Economy),
    ("спорт", Category::Sports),
    ("наука", Category::Science),
    ("происшествия", Category::Accidents),
    ("инфраструктура", Category::Infrastructure),
    ("politics", Category::Politics),
    ("crime", Category::Crime),
    ("culture", Category::Culture),
    ("economy", Category::Economy),
    ("sports", Category::Sports),
    ("science", Category::Science),
    ("accidents", Category::Accidents),
    ("infrastructure", Category::Infrastructure),
];

/// Labels offered to a zero-shot model.
pub fn candidate_labels() -> Vec<&'static str> {
    LABEL_TABLE.iter().take(8).map(|(l, _)| *l).collect()
}

pub fn label_to_category(label: &str) -> Option<Category> {
    let l = label.trim().to_lowercase();
    LABEL_TABLE.iter().find(|(k, _)| *k == l).map(|(_, c)| *c)
}

/// Deterministic keyword tier: first category in precedence order with a hit.
pub fn classify_local(text: &str) -> Category {
    let lower = text.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(_, kws)| kws.iter().any(|kw| lower.contains(kw)))
        .map(|(cat, _)| *cat)
        .unwrap_or(Category::Other)
}

pub struct Classifier {
    remote: Option<DynLabelClient>,
    timeout: Duration,
}

impl Classifier {
    /// Keyword tier only.
    pub fn local() -> Self {
        Self {
            remote: None,
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    pub fn with_remote(client: DynLabelClient, timeout: Duration) -> Self {
        Self {
            remote: Some(client),
            timeout,
        }
    }

    pub fn from_config(cfg: &ClassifierConfig) -> Self {
        match remote::build_client_from_config(cfg) {
            Some(client) => Self::with_remote(client, cfg.timeout()),
            None => Self::local(),
        }
    }

    pub fn remote_provider(&self) -> Option<&'static str> {
        self.remote.as_ref().map(|r| r.provider_name())
    }

    /// Exactly one category for `text`. Never fails.
    pub async fn classify(&self, text: &str) -> Category {
        if self.remote.is_some() {
            match self.classify_remote(text).await {
                Ok(cat) => return cat,
                Err(e) => {
                    counter!("news_classifier_fallback_total").increment(1);
                    debug!(
                        target: "classify",
                        error = %e,
                        "remote classification failed, using keywords"
                    );
                }
            }
        }
        classify_local(text)
    }

    async fn classify_remote(&self, text: &str) -> Result<Category, ClassifyError> {
        let remote = self.remote.as_ref().ok_or(ClassifyError::Disabled)?;
        let snippet: String = text.chars().take(REMOTE_SNIPPET_CHARS).collect();
        let ranked = tokio::time::timeout(self.timeout, remote.labels(&snippet))
            .await
            .map_err(|_| ClassifyError::Timeout(self.timeout))??;
        let top = ranked
            .first()
            .ok_or_else(|| ClassifyError::Malformed("empty label list".into()))?;
        label_to_category(&top.label).ok_or_else(|| ClassifyError::UnknownLabel(top.label.clone()))
    }
}
