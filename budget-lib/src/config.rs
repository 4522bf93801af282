use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use std::{env, fs};

pub const DEFAULT_USER_HEADER: &str = "X-Authenticated-User";

#[derive(Deserialize)]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
    pub honeycomb_api_key: Option<String>,
    #[serde(default = "default_user_header")]
    pub user_header: String,
    #[serde(default)]
    pub recommendation: RecommendationConfig,
}

/// Tuning of the recommendation engine. Every field has a default so the whole table can be
/// omitted.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RecommendationConfig {
    pub default_limit: usize,
    pub fuzzy_window: usize,
    pub tag_keyword_window: usize,
    pub recurring_keyword_window: usize,
    pub amount_patterns: bool,
    pub query_timeout_ms: Option<u64>,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        RecommendationConfig {
            default_limit: 5,
            fuzzy_window: 200,
            tag_keyword_window: 30,
            recurring_keyword_window: 10,
            amount_patterns: false,
            query_timeout_ms: None,
        }
    }
}

impl RecommendationConfig {
    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }
}

fn default_max_pool_size() -> u32 {
    10
}

fn default_user_header() -> String {
    DEFAULT_USER_HEADER.to_string()
}

impl Config {
    pub fn from_file(path: PathBuf) -> Result<Config, anyhow::Error> {
        let config = fs::read_to_string(path).context("Unable to read config file")?;
        Config::from_toml(&config)
    }

    pub fn from_toml(config: &str) -> Result<Config, anyhow::Error> {
        toml::from_str(config).with_context(|| "Unable to parse config")
    }

    pub fn from_env() -> Result<Config, anyhow::Error> {
        let database_url = read_env("DATABASE_URL")?;
        let max_pool_size = match env::var("MAX_POOL_SIZE") {
            Ok(size) => size.parse().context("Unable to parse MAX_POOL_SIZE value")?,
            Err(_) => default_max_pool_size(),
        };
        let honeycomb_api_key = env::var("HONEYCOMB_API_KEY").ok();
        let user_header = env::var("USER_HEADER").unwrap_or_else(|_| default_user_header());

        let mut recommendation = RecommendationConfig::default();
        if let Ok(timeout) = env::var("RECOMMENDATION_TIMEOUT_MS") {
            let timeout = timeout
                .parse()
                .context("Unable to parse RECOMMENDATION_TIMEOUT_MS value")?;
            recommendation.query_timeout_ms = Some(timeout);
        }
        if let Ok(amount_patterns) = env::var("RECOMMENDATION_AMOUNT_PATTERNS") {
            recommendation.amount_patterns = amount_patterns
                .parse()
                .context("Unable to parse RECOMMENDATION_AMOUNT_PATTERNS value")?;
        }

        let config = Config {
            database_url,
            max_pool_size,
            honeycomb_api_key,
            user_header,
            recommendation,
        };
        Ok(config)
    }
}

fn read_env(key: &str) -> Result<String, anyhow::Error> {
    env::var(key).with_context(|| format!("Unable to read env var: {}", key))
}
