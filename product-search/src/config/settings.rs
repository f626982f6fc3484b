//! Environment-driven settings for the product search indexer.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use tracing::warn;

use crate::catalog::MAX_CATALOG_PAGE_SIZE;

/// Default index name.
const DEFAULT_INDEX_NAME: &str = "products";

/// Default catalog base URL.
const DEFAULT_CATALOG_BASE_URL: &str = "http://localhost:9000";

/// Default currency for variants without a price.
const DEFAULT_CURRENCY_CODE: &str = "usd";

const DEFAULT_CATALOG_PAGE_SIZE: u32 = 100;
const DEFAULT_INDEX_CHUNK_SIZE: usize = 1000;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CATALOG_FETCH_TIMEOUT_SECS: u64 = 60;

/// Search engine credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct EngineCredentials {
    pub app_id: String,
    pub api_key: String,
}

impl std::fmt::Debug for EngineCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineCredentials")
            .field("app_id", &self.app_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Settings read once at startup and passed down by value.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// `None` when either credential is missing; indexing is then disabled.
    pub engine: Option<EngineCredentials>,
    pub index_name: String,
    pub catalog_base_url: String,
    pub catalog_admin_token: Option<String>,
    pub default_currency: String,
    pub inventory_remote_lookup: bool,
    pub catalog_page_size: u32,
    pub index_chunk_size: usize,
    pub http_timeout: Duration,
    pub catalog_fetch_timeout: Duration,
    pub wait_for_tasks: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine: None,
            index_name: DEFAULT_INDEX_NAME.to_string(),
            catalog_base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
            catalog_admin_token: None,
            default_currency: DEFAULT_CURRENCY_CODE.to_string(),
            inventory_remote_lookup: false,
            catalog_page_size: DEFAULT_CATALOG_PAGE_SIZE,
            index_chunk_size: DEFAULT_INDEX_CHUNK_SIZE,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            catalog_fetch_timeout: Duration::from_secs(DEFAULT_CATALOG_FETCH_TIMEOUT_SECS),
            wait_for_tasks: true,
        }
    }
}

impl SearchConfig {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `ALGOLIA_APP_ID`, `ALGOLIA_API_KEY`: engine credentials (indexing disabled if either is missing)
    /// - `ALGOLIA_INDEX_NAME`: index name (default: "products")
    /// - `CATALOG_BASE_URL`: catalog admin API base URL (default: http://localhost:9000)
    /// - `CATALOG_ADMIN_TOKEN`: bearer token for the catalog admin API
    /// - `DEFAULT_CURRENCY_CODE`: currency for variants without a price (default: "usd")
    /// - `INVENTORY_REMOTE_LOOKUP`: look up stock remotely when a variant has none (default: false)
    /// - `CATALOG_PAGE_SIZE`: products per catalog page, 1..=1000 (default: 100)
    /// - `INDEX_CHUNK_SIZE`: records per engine write (default: 1000)
    /// - `HTTP_TIMEOUT_SECS`: per-request timeout for engine and inventory calls (default: 10)
    /// - `CATALOG_FETCH_TIMEOUT_SECS`: timeout for fetching the whole catalog (default: 60)
    /// - `ALGOLIA_WAIT_FOR_TASKS`: wait for engine write tasks to publish (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings from a map, for tests and embedding.
    pub fn from_map(vars: &HashMap<String, String>) -> Self {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let engine = match (non_empty("ALGOLIA_APP_ID"), non_empty("ALGOLIA_API_KEY")) {
            (Some(app_id), Some(api_key)) => Some(EngineCredentials { app_id, api_key }),
            _ => None,
        };

        let catalog_page_size: u32 =
            parse_or(&non_empty, "CATALOG_PAGE_SIZE", defaults.catalog_page_size);
        let catalog_page_size = clamp_logged(
            "CATALOG_PAGE_SIZE",
            catalog_page_size,
            1,
            MAX_CATALOG_PAGE_SIZE,
        );

        Self {
            engine,
            index_name: non_empty("ALGOLIA_INDEX_NAME").unwrap_or(defaults.index_name),
            catalog_base_url: non_empty("CATALOG_BASE_URL").unwrap_or(defaults.catalog_base_url),
            catalog_admin_token: non_empty("CATALOG_ADMIN_TOKEN"),
            default_currency: non_empty("DEFAULT_CURRENCY_CODE")
                .unwrap_or(defaults.default_currency),
            inventory_remote_lookup: parse_bool(
                &non_empty,
                "INVENTORY_REMOTE_LOOKUP",
                defaults.inventory_remote_lookup,
            ),
            catalog_page_size,
            index_chunk_size: parse_or(&non_empty, "INDEX_CHUNK_SIZE", defaults.index_chunk_size)
                .max(1),
            http_timeout: Duration::from_secs(parse_or(
                &non_empty,
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
            catalog_fetch_timeout: Duration::from_secs(parse_or(
                &non_empty,
                "CATALOG_FETCH_TIMEOUT_SECS",
                DEFAULT_CATALOG_FETCH_TIMEOUT_SECS,
            )),
            wait_for_tasks: parse_bool(
                &non_empty,
                "ALGOLIA_WAIT_FOR_TASKS",
                defaults.wait_for_tasks,
            ),
        }
    }

    /// Whether engine credentials are configured.
    pub fn indexing_enabled(&self) -> bool {
        self.engine.is_some()
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, default = %default, "Invalid value, using default");
            default
        }),
    }
}

fn parse_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.to_lowercase()) {
        None => default,
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => {
                warn!(key, value = %v, default, "Invalid boolean, using default");
                default
            }
        },
    }
}

fn clamp_logged(key: &str, value: u32, min: u32, max: u32) -> u32 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!(key, value, clamped, "Value out of range, clamped");
    }
    clamped
}
