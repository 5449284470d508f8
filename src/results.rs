use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One element matched by a selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedElement {
    /// Trimmed text content
    pub text: String,

    /// Inner markup (if available)
    pub html: Option<String>,

    /// Attribute map (static strategy only)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    /// Upper-case tag name (browser strategy only)
    #[serde(rename = "tagName", default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
}

impl ScrapedElement {
    /// Create an element with text and markup only
    pub fn new(text: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: Some(html.into()),
            attributes: BTreeMap::new(),
            tag_name: None,
        }
    }
}

/// An anchor found on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub href: String,
}

/// Page-level fields extracted when no selector is given
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub title: String,

    /// Final URL after navigation (browser strategy only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,

    #[serde(rename = "h1")]
    pub headings: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,

    /// First 1000 characters of the body text (browser strategy only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,
}

/// The two shapes a page scrape can take
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageContent {
    Elements {
        elements: Vec<ScrapedElement>,
        count: usize,
    },
    Summary(PageSummary),
}

/// Result of fetching a page with either strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    #[serde(flatten)]
    pub content: PageContent,

    /// Base64 encoded PNG of the viewport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

impl PageResult {
    pub fn from_elements(elements: Vec<ScrapedElement>) -> Self {
        let count = elements.len();
        Self {
            content: PageContent::Elements { elements, count },
            screenshot: None,
        }
    }

    pub fn from_summary(summary: PageSummary) -> Self {
        Self {
            content: PageContent::Summary(summary),
            screenshot: None,
        }
    }

    /// Matched elements, empty for summary-shaped results
    pub fn elements(&self) -> &[ScrapedElement] {
        match &self.content {
            PageContent::Elements { elements, .. } => elements,
            PageContent::Summary(_) => &[],
        }
    }
}

/// A category page list entry for batch crawling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySource {
    pub url: String,
    pub name: String,
}

impl CategorySource {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
        }
    }
}

/// A normalized product extracted from one product card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: Option<u64>,

    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "precio")]
    pub price: Option<f64>,

    #[serde(rename = "imagen")]
    pub image: String,

    #[serde(rename = "categoria")]
    pub category: String,

    /// Base URL of the category the product was found in
    #[serde(rename = "url")]
    pub source_url: String,
}
