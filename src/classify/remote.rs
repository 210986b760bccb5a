//! Remote label providers for the classifier's primary tier.
//!
//! `LabelClient` is the seam: production uses the Hugging Face zero-shot
//! endpoint, tests and local runs use [`MockClient`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classify::candidate_labels;
use crate::config::classifier::ClassifierConfig;
use crate::error::ClassifyError;

/// One label with its model score; lists are ranked best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLabel {
    pub label: String,
    pub score: f32,
}

pub type LabelFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<RankedLabel>, ClassifyError>> + Send + 'a>>;

pub trait LabelClient: Send + Sync {
    /// Rank candidate labels for `text`.
    fn labels<'a>(&'a self, text: &'a str) -> LabelFuture<'a>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynLabelClient = Arc<dyn LabelClient>;

/// Build a client according to config and environment.
///
/// * `CLASSIFIER_TEST_MODE=mock` → deterministic mock answering "происшествия".
/// * `enabled == false` → `None` (keywords only).
/// * `provider == "huggingface"` with a non-empty key → [`HuggingFaceClient`].
pub fn build_client_from_config(cfg: &ClassifierConfig) -> Option<DynLabelClient> {
    if std::env::var("CLASSIFIER_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Some(Arc::new(MockClient::answering("происшествия")));
    }

    if !cfg.enabled {
        return None;
    }

    match cfg.provider.as_str() {
        "huggingface" | "hf" => {
            if cfg.api_key.trim().is_empty() {
                info!("classifier enabled but no API key; using keywords only");
                return None;
            }
            match HuggingFaceClient::new(cfg) {
                Ok(c) => Some(Arc::new(c)),
                Err(e) => {
                    info!(error = %e, "classifier client build failed; using keywords only");
                    None
                }
            }
        }
        other => {
            info!(provider = other, "unsupported classifier provider; using keywords only");
            None
        }
    }
}

/// Zero-shot classification over the Hugging Face Inference API.
pub struct HuggingFaceClient {
    http: reqwest::Client,
    api_key: String,
    url: String,
}

pub const DEFAULT_HF_ENDPOINT: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_HF_MODEL: &str = "MoritzLaurer/mDeBERTa-v3-base-mnli-xnli";

impl HuggingFaceClient {
    pub fn new(cfg: &ClassifierConfig) -> Result<Self, ClassifyError> {
        let http = reqwest::Client::builder()
            .user_agent("karelia-news/0.1 (+github.com/lumlich/karelia-news)")
            .connect_timeout(Duration::from_secs(4))
            .timeout(cfg.timeout())
            .build()?;
        let endpoint = cfg
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_HF_ENDPOINT)
            .trim_end_matches('/');
        let model = cfg.model.as_deref().unwrap_or(DEFAULT_HF_MODEL);
        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            url: format!("{endpoint}/{model}"),
        })
    }
}

#[derive(Serialize)]
struct ZeroShotReq<'a> {
    inputs: &'a str,
    parameters: ZeroShotParams,
}

#[derive(Serialize)]
struct ZeroShotParams {
    candidate_labels: Vec<&'static str>,
    multi_label: bool,
}

/// The API answers either `{labels, scores}` or a ranked `[{label, score}]` list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ZeroShotResp {
    Columns { labels: Vec<String>, scores: Vec<f32> },
    Ranked(Vec<RankedLabel>),
}

impl ZeroShotResp {
    fn into_ranked(self) -> Result<Vec<RankedLabel>, ClassifyError> {
        let mut out = match self {
            ZeroShotResp::Columns { labels, scores } => {
                if labels.len() != scores.len() {
                    return Err(ClassifyError::Malformed(format!(
                        "{} labels vs {} scores",
                        labels.len(),
                        scores.len()
                    )));
                }
                labels
                    .into_iter()
                    .zip(scores)
                    .map(|(label, score)| RankedLabel { label, score })
                    .collect::<Vec<_>>()
            }
            ZeroShotResp::Ranked(v) => v,
        };
        out.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(out)
    }
}

/// Parse a zero-shot response body into a ranked label list.
pub fn parse_zero_shot(body: &str) -> Result<Vec<RankedLabel>, ClassifyError> {
    let resp: ZeroShotResp =
        serde_json::from_str(body).map_err(|e| ClassifyError::Malformed(e.to_string()))?;
    resp.into_ranked()
}

impl LabelClient for HuggingFaceClient {
    fn labels<'a>(&'a self, text: &'a str) -> LabelFuture<'a> {
        Box::pin(async move {
            let req = ZeroShotReq {
                inputs: text,
                parameters: ZeroShotParams {
                    candidate_labels: candidate_labels(),
                    multi_label: false,
                },
            };
            let resp = self
                .http
                .post(&self.url)
                .bearer_auth(&self.api_key)
                .json(&req)
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(ClassifyError::Status(resp.status().as_u16()));
            }
            let body = resp.text().await?;
            parse_zero_shot(&body)
        })
    }

    fn provider_name(&self) -> &'static str {
        "huggingface"
    }
}

/// Fixed answer for tests/local runs. `None` simulates a failing provider.
#[derive(Clone)]
pub struct MockClient {
    pub fixed: Option<Vec<RankedLabel>>,
    pub delay: Duration,
}

impl MockClient {
    pub fn answering(label: &str) -> Self {
        Self {
            fixed: Some(vec![RankedLabel {
                label: label.to_string(),
                score: 0.9,
            }]),
            delay: Duration::ZERO,
        }
    }

    pub fn failing() -> Self {
        Self {
            fixed: None,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl LabelClient for MockClient {
    fn labels<'a>(&'a self, _text: &'a str) -> LabelFuture<'a> {
        let out = self.fixed.clone();
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            out.ok_or_else(|| ClassifyError::Malformed("mock failure".into()))
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_column_response_and_ranks() {
        let body = r#"{"sequence":"x","labels":["спорт","политика"],"scores":[0.2,0.7]}"#;
        let r = parse_zero_shot(body).unwrap();
        assert_eq!(r[0].label, "политика");
    }

    #[test]
    fn parses_ranked_list_response() {
        let body = r#"[{"label":"crime","score":0.8},{"label":"sports","score":0.1}]"#;
        let r = parse_zero_shot(body).unwrap();
        assert_eq!(r[0].label, "crime");
    }

    #[test]
    fn mismatched_columns_are_malformed() {
        let body = r#"{"labels":["a","b"],"scores":[0.1]}"#;
        assert!(matches!(parse_zero_shot(body), Err(ClassifyError::Malformed(_))));
        assert!(parse_zero_shot("not json").is_err());
    }

    #[test]
    #[serial_test::serial]
    fn disabled_config_builds_no_client() {
        std::env::remove_var("CLASSIFIER_TEST_MODE");
        let cfg = ClassifierConfig::default();
        assert!(build_client_from_config(&cfg).is_none());
    }
}
