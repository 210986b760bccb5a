// src/ingest/fetch.rs
//! Shared HTTP fetcher: identifying User-Agent, per-request timeout and a fixed
//! retry budget with a constant delay between attempts.

use std::time::Duration;

use metrics::counter;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::FetchError;

#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub user_agent: String,
    pub timeout: Duration,
    /// Extra attempts after the first one.
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            user_agent: "karelia-news/0.1 (+https://github.com/lumlich/karelia-news)".to_string(),
            timeout: Duration::from_secs(15),
            max_retries: 2,
            retry_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: FetchPolicy,
}

impl HttpFetcher {
    pub fn new(policy: FetchPolicy) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(policy.user_agent.clone())
            .connect_timeout(policy.timeout.min(Duration::from_secs(5)))
            .timeout(policy.timeout)
            .build()?;
        Ok(Self { client, policy })
    }

    /// GET `url` and return the body text. Retries transport errors, timeouts
    /// and non-success statuses up to `max_retries` times.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0u32;
        loop {
            match self.try_once(url).await {
                Ok(body) => {
                    debug!(%url, bytes = body.len(), attempt, "fetched");
                    return Ok(body);
                }
                Err(e) if attempt < self.policy.max_retries => {
                    attempt += 1;
                    counter!("news_fetch_retries_total").increment(1);
                    warn!(
                        %url,
                        error = %e,
                        attempt,
                        "fetch failed, retrying in {:?}",
                        self.policy.retry_delay
                    );
                    tokio::time::sleep(self.policy.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_once(&self, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.policy.timeout)
            } else {
                FetchError::Http(e)
            }
        })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.text().await?)
    }
}
