//! Error types for fetching, batch crawling and configuration.

use thiserror::Error;

/// Failure of the static (HTTP + HTML parse) strategy.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },
}

/// Failure of the headless browser strategy.
#[derive(Debug, Error)]
pub enum BrowserFetchError {
    #[error("could not connect to any WebDriver server (tried {tried})")]
    Connect { tried: String },

    #[error("browser session has been shut down")]
    ShutDown,

    #[error("navigation to {url} timed out after {secs}s")]
    NavigationTimeout { url: String, secs: u64 },

    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: fantoccini::error::CmdError,
    },

    #[error("tab operation failed: {0}")]
    Tab(#[source] fantoccini::error::CmdError),

    #[error("script evaluation failed: {0}")]
    Evaluation(#[source] fantoccini::error::CmdError),

    #[error("unexpected evaluation result: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("screenshot failed: {0}")]
    Screenshot(#[source] fantoccini::error::CmdError),
}

/// Error returned at the [`crate::fetchers::PageFetcher`] seam.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("error while scraping: {0}")]
    Static(#[from] FetchError),

    #[error("error while scraping with browser: {0}")]
    Browser(#[from] BrowserFetchError),
}

/// A single category source whose pagination had to be abandoned.
#[derive(Debug, Error)]
#[error("category `{category}` abandoned at page {page} ({url}): {cause}")]
pub struct BatchSourceError {
    pub category: String,
    pub url: String,
    pub page: u32,
    #[source]
    pub cause: ScrapeError,
}

/// Configuration loading failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {var}: {value}")]
    Env { var: &'static str, value: String },
}
