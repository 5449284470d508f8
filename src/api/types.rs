//! Request and response types for the scraping API.

use crate::fetchers::FetchRequest;
use crate::results::PageResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Upper bound for `waitFor`, in milliseconds
pub const MAX_WAIT_FOR_MS: u64 = 10_000;

/// Body of `POST /scrape`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub url: Option<String>,
    pub selector: Option<String>,
    pub wait_for: Option<u64>,
    pub screenshot: Option<bool>,
    pub user_agent: Option<String>,
    pub advanced: Option<bool>,
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedScrape {
    pub fetch: FetchRequest,
    pub method: ScrapeMethod,
}

impl ScrapeRequest {
    /// Checks field constraints and builds the fetch to run
    ///
    /// The smart dispatcher only receives the URL and selector; the browser
    /// options apply when `advanced` is set.
    pub fn validate(self) -> Result<ValidatedScrape, String> {
        let url = match self.url {
            Some(url) if !url.trim().is_empty() => url,
            Some(_) => return Err(r#""url" is not allowed to be empty"#.to_string()),
            None => return Err(r#""url" is required"#.to_string()),
        };
        if Url::parse(&url).is_err() {
            return Err(r#""url" must be a valid uri"#.to_string());
        }

        if let Some(wait_for) = self.wait_for {
            if wait_for > MAX_WAIT_FOR_MS {
                return Err(format!(
                    r#""waitFor" must be less than or equal to {MAX_WAIT_FOR_MS}"#
                ));
            }
        }

        let mut fetch = FetchRequest::new(url);
        fetch.selector = self.selector;

        let method = if self.advanced.unwrap_or(false) {
            fetch.wait_for = self.wait_for.map(Duration::from_millis);
            fetch.screenshot = self.screenshot.unwrap_or(false);
            fetch.user_agent = self.user_agent;
            ScrapeMethod::Browser
        } else {
            ScrapeMethod::Smart
        };

        Ok(ValidatedScrape { fetch, method })
    }
}

/// How a `/scrape` request was served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScrapeMethod {
    #[serde(rename = "smart")]
    Smart,
    /// Name kept from the deployed API's wire format
    #[serde(rename = "puppeteer")]
    Browser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeMetadata {
    pub url: String,
    pub scraped_at: String,
    pub execution_time: String,
    pub method: ScrapeMethod,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub success: bool,
    pub data: PageResult,
    pub metadata: ScrapeMetadata,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub status: String,
    pub timestamp: String,
    pub version: String,
}

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str) -> ScrapeRequest {
        ScrapeRequest {
            url: Some(url.to_string()),
            ..ScrapeRequest::default()
        }
    }

    #[test]
    fn test_smart_request_drops_browser_options() {
        let req = ScrapeRequest {
            selector: Some(".card".to_string()),
            wait_for: Some(500),
            screenshot: Some(true),
            user_agent: Some("Bot".to_string()),
            ..request("https://shop.example.com")
        };
        let validated = req.validate().unwrap();
        assert_eq!(validated.method, ScrapeMethod::Smart);
        assert_eq!(
            validated.fetch,
            FetchRequest::new("https://shop.example.com").with_selector(".card")
        );
    }

    #[test]
    fn test_advanced_request_keeps_browser_options() {
        let req = ScrapeRequest {
            wait_for: Some(500),
            screenshot: Some(true),
            user_agent: Some("Bot".to_string()),
            advanced: Some(true),
            ..request("https://shop.example.com")
        };
        let validated = req.validate().unwrap();
        assert_eq!(validated.method, ScrapeMethod::Browser);
        assert_eq!(validated.fetch.wait_for, Some(Duration::from_millis(500)));
        assert!(validated.fetch.screenshot);
        assert_eq!(validated.fetch.user_agent.as_deref(), Some("Bot"));
    }

    #[test]
    fn test_invalid_requests() {
        assert!(ScrapeRequest::default().validate().is_err());
        assert!(request("").validate().is_err());
        assert!(request("not a url").validate().is_err());
        assert!(request("/relative/path").validate().is_err());

        let req = ScrapeRequest {
            wait_for: Some(MAX_WAIT_FOR_MS + 1),
            ..request("https://shop.example.com")
        };
        assert!(req.validate().unwrap_err().contains("waitFor"));

        let req = ScrapeRequest {
            wait_for: Some(MAX_WAIT_FOR_MS),
            ..request("https://shop.example.com")
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_method_wire_names() {
        assert_eq!(serde_json::to_value(ScrapeMethod::Smart).unwrap(), "smart");
        assert_eq!(
            serde_json::to_value(ScrapeMethod::Browser).unwrap(),
            "puppeteer"
        );
    }
}
