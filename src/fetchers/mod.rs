//! Page fetching strategies and the fallback dispatcher between them.

pub mod browser;
pub mod smart;
pub mod static_page;

pub use browser::{BrowserFetcher, BrowserSession};
pub use smart::SmartFetcher;
pub use static_page::StaticFetcher;

use crate::error::ScrapeError;
use crate::results::PageResult;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// What to fetch and how to extract it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchRequest {
    pub url: String,
    /// CSS selector; without one a page summary is extracted
    pub selector: Option<String>,
    /// Extra delay after navigation (browser strategy only)
    pub wait_for: Option<Duration>,
    /// Capture a viewport screenshot (browser strategy only)
    pub screenshot: bool,
    /// User-agent override (browser strategy only)
    pub user_agent: Option<String>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_wait_for(mut self, wait_for: Duration) -> Self {
        self.wait_for = Some(wait_for);
        self
    }

    pub fn with_screenshot(mut self, screenshot: bool) -> Self {
        self.screenshot = screenshot;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// The extraction strategies a page can be fetched with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Plain HTTP GET and HTML parsing, no scripts executed
    Static,
    /// Rendered in a headless browser
    Browser,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Static => f.write_str("static"),
            Strategy::Browser => f.write_str("browser"),
        }
    }
}

/// Something that turns a [`FetchRequest`] into a [`PageResult`]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<PageResult, ScrapeError>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch(&self, request: &FetchRequest) -> Result<PageResult, ScrapeError> {
        (**self).fetch(request).await
    }
}
