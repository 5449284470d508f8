use crate::error::FetchError;
use crate::results::{Link, PageResult, PageSummary, ScrapedElement};
use scraper::{ElementRef, Html, Selector};

/// Maximum number of anchors reported in a page summary
pub const MAX_LINKS: usize = 50;

/// Parses an HTML document and extracts either the elements matching `selector`
/// or, without a selector, a summary of the page
pub fn parse(html: &str, selector: Option<&str>) -> Result<PageResult, FetchError> {
    let doc = Html::parse_document(html);

    match selector {
        Some(selector) => {
            let elements = select_elements(&doc, selector)?;
            ::log::debug!(
                "HTML parser matched {} elements for `{}`",
                elements.len(),
                selector
            );
            Ok(PageResult::from_elements(elements))
        }
        None => Ok(PageResult::from_summary(summarize(&doc))),
    }
}

/// Collects text, inner markup and attributes of every element matching `selector`
pub fn select_elements(doc: &Html, selector: &str) -> Result<Vec<ScrapedElement>, FetchError> {
    let parsed = Selector::parse(selector).map_err(|e| FetchError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })?;

    Ok(doc
        .select(&parsed)
        .map(|el| ScrapedElement {
            text: element_text(&el),
            html: Some(el.inner_html()),
            attributes: el
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            tag_name: None,
        })
        .collect())
}

/// Extracts title, meta description/keywords, h1 texts and the first links
pub fn summarize(doc: &Html) -> PageSummary {
    let title_selector = Selector::parse("title").unwrap();
    let title = doc
        .select(&title_selector)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();

    let h1_selector = Selector::parse("h1").unwrap();
    let headings = doc.select(&h1_selector).map(|el| element_text(&el)).collect();

    let link_selector = Selector::parse("a[href]").unwrap();
    let links = doc
        .select(&link_selector)
        .filter_map(|el| {
            el.value().attr("href").map(|href| Link {
                text: element_text(&el),
                href: href.to_string(),
            })
        })
        .take(MAX_LINKS)
        .collect::<Vec<_>>();

    ::log::debug!("HTML parser found {} links", links.len());

    PageSummary {
        title,
        url: None,
        description: meta_content(doc, "description"),
        keywords: Some(meta_content(doc, "keywords")),
        headings,
        links: Some(links),
        body_text: None,
    }
}

/// Content of `<meta name="...">`, empty if absent
fn meta_content(doc: &Html, name: &str) -> String {
    Selector::parse(&format!(r#"meta[name="{name}"]"#))
        .ok()
        .and_then(|selector| {
            doc.select(&selector)
                .next()
                .and_then(|el| el.value().attr("content"))
                .map(|s| s.to_string())
        })
        .unwrap_or_default()
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}
