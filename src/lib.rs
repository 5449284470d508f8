// Re-export modules
pub mod api;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod fetchers;
pub mod parsers;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use crawlers::{BatchOptions, run_batch};
pub use error::{BatchSourceError, BrowserFetchError, FetchError, ScrapeError};
pub use fetchers::{
    BrowserFetcher, BrowserSession, FetchRequest, PageFetcher, SmartFetcher, StaticFetcher,
    Strategy,
};
pub use results::{CategorySource, PageResult, ProductRecord, ScrapedElement};
