// src/config/classifier.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf, time::Duration};

pub const DEFAULT_CLASSIFIER_CONFIG_PATH: &str = "config/classifier.json";
pub const ENV_CLASSIFIER_CONFIG_PATH: &str = "NEWS_CLASSIFIER_CONFIG";

fn default_provider() -> String {
    "huggingface".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub enabled: bool,
    /// "huggingface" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    /// "ENV" means: read from HF_API_TOKEN
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            model: None,
            endpoint: None,
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClassifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(1, 60))
    }

    pub fn from_json_str(data: &str) -> anyhow::Result<Self> {
        let mut cfg: ClassifierConfig = serde_json::from_str(data)?;

        // Normalize provider
        cfg.provider = cfg.provider.trim().to_lowercase();

        // Resolve api key if "ENV" (only needed when enabled)
        if cfg.enabled && cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = match cfg.provider.as_str() {
                "huggingface" | "hf" => env::var("HF_API_TOKEN")
                    .map_err(|_| anyhow::anyhow!("Missing HF_API_TOKEN env var"))?,
                other => anyhow::bail!("Unsupported provider in config: {other}"),
            };
        }

        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// `$NEWS_CLASSIFIER_CONFIG`, then `config/classifier.json`. A missing file
    /// means "disabled"; a broken one is an error.
    pub fn load_default() -> anyhow::Result<Self> {
        let path = env::var(ENV_CLASSIFIER_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CLASSIFIER_CONFIG_PATH));
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(&path)
    }
}
