use crate::config::BatchConfig;
use crate::error::BatchSourceError;
use crate::fetchers::{FetchRequest, PageFetcher};
use crate::results::{CategorySource, ProductRecord};
use crate::utils::page_url;
use std::time::Duration;

/// Options for a batch crawl
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Selector matching one product card
    pub selector: String,
    /// Pause before every fetch except the first one of the run
    pub delay: Duration,
}

impl BatchOptions {
    pub fn new(selector: impl Into<String>, delay: Duration) -> Self {
        Self {
            selector: selector.into(),
            delay,
        }
    }
}

impl From<&BatchConfig> for BatchOptions {
    fn from(config: &BatchConfig) -> Self {
        Self::new(config.selector.clone(), Duration::from_millis(config.delay_ms))
    }
}

/// Paginates every category source and normalizes the product cards found
///
/// Sources are crawled one after another, pages in order. A source stops at the
/// first page without product cards, or at the first page that fails to fetch;
/// a failed source is logged and the crawl moves on to the next one.
pub async fn run_batch<F>(
    fetcher: &F,
    sources: &[CategorySource],
    options: &BatchOptions,
) -> Vec<ProductRecord>
where
    F: PageFetcher + ?Sized,
{
    let start = std::time::Instant::now();
    let mut records = Vec::new();
    let mut first_fetch = true;

    for source in sources {
        ::log::info!("Crawling category {} ({})", source.name, source.url);
        let mut page = 1;

        loop {
            let url = page_url(&source.url, page);

            if !first_fetch {
                tokio::time::sleep(options.delay).await;
            }
            first_fetch = false;

            let request = FetchRequest::new(url.clone()).with_selector(options.selector.clone());
            let result = match fetcher.fetch(&request).await {
                Ok(result) => result,
                Err(cause) => {
                    let err = BatchSourceError {
                        category: source.name.clone(),
                        url,
                        page,
                        cause,
                    };
                    ::log::error!("{}", err);
                    break;
                }
            };

            let elements = result.elements();
            if elements.is_empty() {
                ::log::info!(
                    "No products on page {} of {}, moving on",
                    page,
                    source.name
                );
                break;
            }

            ::log::debug!(
                "Found {} products on page {} of {}",
                elements.len(),
                page,
                source.name
            );
            records.extend(
                elements
                    .iter()
                    .map(|element| ProductRecord::from_element(element, source)),
            );
            page += 1;
        }
    }

    ::log::info!(
        "Batch complete - {} products from {} categories in {:.2} seconds",
        records.len(),
        sources.len(),
        start.elapsed().as_secs_f64()
    );

    records
}
