//! Normalization of raw product-card text into product fields.
//!
//! Each step is a pure function that degrades to the input (or an empty value)
//! when its pattern is missing, so the pipeline as a whole never fails.

use crate::results::{CategorySource, ProductRecord, ScrapedElement};
use regex::Regex;
use std::sync::LazyLock;

/// Marker the storefront appends to products without color choice
pub const COLOR_MARKER: &str = "*Color No Seleccionable";

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Referencia:\s*([0-9]+)").expect("REFERENCE regex"));

static TWO_DECIMALS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+\.[0-9]{2}").expect("TWO_DECIMALS regex"));

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img[^>]+src=["']([^"']+)["']"#).expect("IMG_SRC regex")
});

/// Reference number split off the card text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Digits of the reference, empty if none was found
    pub referencia: String,
    /// Remaining text
    pub contenido: String,
}

/// Product name and the two price fields of a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPrice {
    pub producto: String,
    /// Current price, including its currency sign
    pub precio_uno: String,
    /// List price, including its currency sign
    pub precio_dos: String,
}

/// Removes the color marker and surrounding whitespace
pub fn clean_text(text: &str) -> String {
    text.replace(COLOR_MARKER, "").trim().to_string()
}

/// Splits a `Referencia: <digits>` segment off the text
pub fn extract_reference(text: &str) -> Reference {
    match REFERENCE.captures(text) {
        Some(caps) => {
            let span = caps.get(0).map_or(0..0, |m| m.range());
            let referencia = caps.get(1).map_or("", |m| m.as_str()).to_string();
            let contenido = format!("{}{}", &text[..span.start], &text[span.end..]);
            Reference {
                referencia,
                contenido: contenido.trim().to_string(),
            }
        }
        None => Reference {
            referencia: String::new(),
            contenido: text.trim().to_string(),
        },
    }
}

/// Splits `"<name> $<price> $<list price>"` into its parts
pub fn split_product_price(contenido: &str) -> ProductPrice {
    let Some(first) = contenido.find('$') else {
        return ProductPrice {
            producto: contenido.to_string(),
            precio_uno: String::new(),
            precio_dos: String::new(),
        };
    };

    let producto = contenido[..first].trim().to_string();
    let resto = contenido[first..].trim();

    // `resto` starts with the first `$`, so look for the second one after it
    match resto[1..].find('$').map(|idx| idx + 1) {
        Some(second) => {
            let precio_uno = resto[..second].trim().to_string();
            let mut precio_dos = resto[second..].trim();
            if let Some(last) = TWO_DECIMALS.find_iter(precio_dos).last() {
                precio_dos = precio_dos[..last.end()].trim();
            }
            ProductPrice {
                producto,
                precio_uno,
                precio_dos: precio_dos.to_string(),
            }
        }
        None => ProductPrice {
            producto,
            precio_uno: resto.to_string(),
            precio_dos: String::new(),
        },
    }
}

/// `src` of the first `<img>` tag in the markup, empty if none
pub fn extract_img_url(html: &str) -> String {
    IMG_SRC
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Numeric value of a price field such as `"$1,234.56"`
///
/// A comma is the decimal separator unless a dot follows it, in which case
/// commas group thousands.
pub fn parse_price(raw: &str) -> Option<f64> {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if stripped.is_empty() {
        return None;
    }

    let normalized = match (stripped.rfind(','), stripped.rfind('.')) {
        (Some(comma), Some(dot)) if dot > comma => stripped.replace(',', ""),
        (Some(_), Some(_)) => stripped.replace('.', "").replace(',', "."),
        _ => stripped.replace(',', "."),
    };

    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}

impl ProductRecord {
    /// Runs the normalization pipeline on one product card
    pub fn from_element(element: &ScrapedElement, source: &CategorySource) -> Self {
        let cleaned = clean_text(&element.text);
        let reference = extract_reference(&cleaned);
        let prices = split_product_price(&reference.contenido);
        let image = element
            .html
            .as_deref()
            .map(extract_img_url)
            .unwrap_or_default();

        Self {
            id: reference.referencia.parse().ok(),
            name: prices.producto,
            price: parse_price(&prices.precio_uno),
            image,
            category: source.name.clone(),
            source_url: source.url.clone(),
        }
    }
}
