use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static QUOTED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([A-Za-z0-9_]+)":"#).expect("QUOTED_KEY regex"));

/// Append the `page` query parameter to a category URL
pub fn page_url(base_url: &str, page: u32) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}page={page}")
}

/// Pretty-printed JSON with object keys left unquoted (`{ id: 1 }`)
///
/// This is not valid JSON; consumers of the batch endpoint parse it leniently.
pub fn to_unquoted_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let json = serde_json::to_string_pretty(value)?;
    Ok(QUOTED_KEY.replace_all(&json, "$1:").into_owned())
}
