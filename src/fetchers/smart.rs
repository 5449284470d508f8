use crate::error::ScrapeError;
use crate::fetchers::{FetchRequest, PageFetcher, Strategy};
use crate::results::PageResult;
use async_trait::async_trait;

/// Tries the static strategy first and escalates to the browser once on failure
pub struct SmartFetcher<S, B> {
    primary: S,
    fallback: B,
}

impl<S, B> SmartFetcher<S, B>
where
    S: PageFetcher,
    B: PageFetcher,
{
    pub fn new(primary: S, fallback: B) -> Self {
        Self { primary, fallback }
    }

    /// Fetches `request`, reporting which strategy produced the result
    pub async fn fetch_with_strategy(
        &self,
        request: &FetchRequest,
    ) -> Result<(PageResult, Strategy), ScrapeError> {
        ::log::info!("Trying static scraping for: {}", request.url);
        match self.primary.fetch(request).await {
            Ok(result) => Ok((result, Strategy::Static)),
            Err(e) => {
                ::log::info!(
                    "Static scraping failed ({}), using browser for: {}",
                    e,
                    request.url
                );
                let result = self.fallback.fetch(request).await?;
                Ok((result, Strategy::Browser))
            }
        }
    }
}

#[async_trait]
impl<S, B> PageFetcher for SmartFetcher<S, B>
where
    S: PageFetcher,
    B: PageFetcher,
{
    async fn fetch(&self, request: &FetchRequest) -> Result<PageResult, ScrapeError> {
        let (result, strategy) = self.fetch_with_strategy(request).await?;
        ::log::debug!("{} served by the {} strategy", request.url, strategy);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BrowserFetchError, FetchError};
    use crate::results::ScrapedElement;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers every call with a canned outcome and counts the calls
    struct Scripted {
        calls: AtomicUsize,
        fail_with: Option<fn() -> ScrapeError>,
        text: &'static str,
    }

    impl Scripted {
        fn ok(text: &'static str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_with: None,
                text,
            })
        }

        fn failing(fail_with: fn() -> ScrapeError) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_with: Some(fail_with),
                text: "",
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for Scripted {
        async fn fetch(&self, _request: &FetchRequest) -> Result<PageResult, ScrapeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(fail) => Err(fail()),
                None => Ok(PageResult::from_elements(vec![ScrapedElement::new(
                    self.text, "",
                )])),
            }
        }
    }

    fn static_failure() -> ScrapeError {
        FetchError::Status {
            url: "https://shop.example.com".to_string(),
            status: 503,
        }
        .into()
    }

    fn browser_failure() -> ScrapeError {
        BrowserFetchError::NavigationTimeout {
            url: "https://shop.example.com".to_string(),
            secs: 30,
        }
        .into()
    }

    fn request() -> FetchRequest {
        FetchRequest::new("https://shop.example.com").with_selector(".card")
    }

    #[tokio::test]
    async fn test_static_success_skips_browser() {
        let primary = Scripted::ok("static");
        let fallback = Scripted::ok("browser");
        let smart = SmartFetcher::new(primary.clone(), fallback.clone());

        let (result, strategy) = smart.fetch_with_strategy(&request()).await.unwrap();
        assert_eq!(strategy, Strategy::Static);
        assert_eq!(result.elements()[0].text, "static");
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_falls_back_exactly_once() {
        let primary = Scripted::failing(static_failure);
        let fallback = Scripted::ok("browser");
        let smart = SmartFetcher::new(primary.clone(), fallback.clone());

        let (result, strategy) = smart.fetch_with_strategy(&request()).await.unwrap();
        assert_eq!(strategy, Strategy::Browser);
        assert_eq!(result.elements()[0].text, "browser");
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_browser_failure_is_propagated() {
        let primary = Scripted::failing(static_failure);
        let fallback = Scripted::failing(browser_failure);
        let smart = SmartFetcher::new(primary.clone(), fallback.clone());

        let err = smart.fetch(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::Browser(BrowserFetchError::NavigationTimeout { .. })
        ));
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }
}
