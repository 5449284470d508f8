use crate::error::ConfigError;
use crate::results::CategorySource;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Prefix every route is nested under
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Maximum accepted request body size
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

/// Fixed-window request limit per client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
}

/// Configuration for the static (HTTP) strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_fetch_user_agent")]
    pub user_agent: String,
}

/// Configuration for the headless browser strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Session-wide user-agent; requests may still override it per tab
    #[serde(default)]
    pub user_agent: Option<String>,

    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,
}

/// Configuration for the category batch crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Selector matching one product card
    #[serde(default = "default_batch_selector")]
    pub selector: String,

    /// Pause between consecutive page fetches
    #[serde(default = "default_batch_delay_ms")]
    pub delay_ms: u64,

    /// Emit standard JSON instead of the unquoted-key variant
    #[serde(default)]
    pub quote_keys: bool,

    #[serde(default)]
    pub categories: Vec<CategorySource>,
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub batch: BatchConfig,
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let display = path.as_ref().display().to_string();
        let mut file = File::open(&path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|source| ConfigError::Io {
                path: display.clone(),
                source,
            })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Apply `WEBDRIVER_URL`, `HOST` and `PORT` overrides
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(webdriver_url) = lookup("WEBDRIVER_URL").filter(|v| !v.is_empty()) {
            self.browser.webdriver_url = webdriver_url;
        }
        if let Some(host) = lookup("HOST").filter(|v| !v.is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT").filter(|v| !v.is_empty()) {
            self.server.port = port.parse().map_err(|_| ConfigError::Env {
                var: "PORT",
                value: port,
            })?;
        }
        Ok(())
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_base_path() -> String {
    "/api/v1".to_string()
}

fn default_body_limit_bytes() -> usize {
    10 * 1024 * 1024
}

/// 15 minutes
fn default_window_ms() -> u64 {
    15 * 60 * 1000
}

fn default_max_requests() -> u32 {
    100
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_fetch_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

/// Product card of the VTEX storefront template
fn default_batch_selector() -> String {
    ".vtex-product-summary-2-x-element".to_string()
}

fn default_batch_delay_ms() -> u64 {
    2000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_path: default_base_path(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            max_requests: default_max_requests(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_fetch_user_agent(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            user_agent: None,
            navigation_timeout_secs: default_navigation_timeout_secs(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            selector: default_batch_selector(),
            delay_ms: default_batch_delay_ms(),
            quote_keys: false,
            categories: Vec::new(),
        }
    }
}
