use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_7_6) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.4 Safari/605.1.15";

/// Queries and keyword lists used by the discovery pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// A word that returns results on most English-language sites.
    pub generic_query: String,
    /// A nonsense token that returns no results.
    pub nonsense_query: String,
    /// Category name -> common word, tried when the generic query fails.
    pub fallback_queries: BTreeMap<String, String>,
    /// Form text matching any of these marks the form as not-a-search form.
    pub skip_keywords: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            generic_query: "the".to_string(),
            nonsense_query: "asdfghjklqwerty12345".to_string(),
            fallback_queries: BTreeMap::from([
                ("Books".to_string(), "murder".to_string()),
                ("Movies".to_string(), "love".to_string()),
            ]),
            skip_keywords: [
                "login",
                "log in",
                "sign in",
                "signin",
                "username",
                "password",
                "register",
                "sign up",
                "signup",
                "subscribe",
                "newsletter",
                "contact",
                "comment",
                "forgot",
                "e-mail",
                "email",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl DiscoveryConfig {
    pub fn fallback_query(&self, category: Option<&str>) -> Option<&str> {
        category
            .and_then(|c| self.fallback_queries.get(c))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub accept_language: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub fetch: FetchConfig,
}

impl Config {
    /// Builds a config from the environment (and `.env` if present), defaulting every
    /// unset variable.
    pub fn from_env() -> Result<Config> {
        dotenv().ok();
        let mut discovery = DiscoveryConfig::default();
        let mut fetch = FetchConfig::default();

        if let Some(q) = get_env("SITESCOUT_GENERIC_QUERY") {
            discovery.generic_query = q;
        }
        if let Some(q) = get_env("SITESCOUT_NONSENSE_QUERY") {
            discovery.nonsense_query = q;
        }
        if let Some(raw) = get_env("SITESCOUT_FALLBACK_QUERIES") {
            discovery.fallback_queries = parse_fallback_queries(&raw)?;
        }
        if let Some(raw) = get_env("SITESCOUT_SKIP_KEYWORDS") {
            discovery.skip_keywords = parse_list(&raw);
        }
        if let Some(raw) = get_env("SITESCOUT_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("SITESCOUT_TIMEOUT_SECS is not a number: {raw}"))?;
            fetch.timeout = Duration::from_secs(secs);
        }
        fetch.user_agent = get_env_or_default("SITESCOUT_USER_AGENT", DEFAULT_USER_AGENT);

        Ok(Config { discovery, fetch })
    }
}

fn get_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parses `Books=murder,Movies=love`.
fn parse_fallback_queries(raw: &str) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for entry in parse_list(raw) {
        let Some((category, query)) = entry.split_once('=') else {
            bail!("fallback query entry {entry:?} is not Category=query");
        };
        let (category, query) = (category.trim(), query.trim());
        if category.is_empty() || query.is_empty() {
            bail!("fallback query entry {entry:?} has an empty side");
        }
        out.insert(category.to_string(), query.to_string());
    }
    Ok(out)
}
