use crate::config::FetchConfig;
use crate::error::{FetchError, ScrapeError};
use crate::fetchers::{FetchRequest, PageFetcher};
use crate::parsers;
use crate::results::PageResult;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Fetches raw HTML over HTTP and parses it without running scripts
#[derive(Debug, Clone)]
pub struct StaticFetcher {
    client: Client,
}

impl StaticFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// Downloads `url` and extracts elements matching `selector`, or a page summary
    pub async fn scrape(&self, url: &str, selector: Option<&str>) -> Result<PageResult, FetchError> {
        let start = std::time::Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        let result = parsers::html::parse(&body, selector)?;

        ::log::debug!(
            "Static fetch of {} took {:.2} seconds",
            url,
            start.elapsed().as_secs_f64()
        );

        Ok(result)
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<PageResult, ScrapeError> {
        self.scrape(&request.url, request.selector.as_deref())
            .await
            .map_err(|e| {
                ::log::error!("Static scraping of {} failed: {}", request.url, e);
                ScrapeError::from(e)
            })
    }
}
