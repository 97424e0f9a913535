/// Key-based field extraction over tabular markup
///
/// Catalog detail pages list most metadata as `<tr><td>Key:</td><td>value</td></tr>`
/// rows. Every field getter goes through the same lookup: the first row whose
/// text contains the key wins, anchor text is preferred over plain cell text,
/// and the site's `----` placeholder means "unknown".
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Find the first row matched by `rows` whose full text contains `key`
fn matching_row<'a>(doc: &'a Html, rows: &str, key: &str) -> Option<ElementRef<'a>> {
    let row_selector = Selector::parse(rows).ok()?;

    for row in doc.select(&row_selector) {
        let text = row.text().collect::<String>();
        if text.contains(key) {
            debug!("Row matched key '{}': {}", key, text.trim());
            return Some(row);
        }
    }

    None
}

/// Whether a cell value is the site's "unknown" placeholder (a run of hyphens)
pub fn is_placeholder(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c == '-')
}

/// Look up a single-valued field by its row key.
///
/// Returns an empty string when no row matches or the value is a placeholder.
pub fn table_value(doc: &Html, rows: &str, key: &str) -> String {
    let Some(row) = matching_row(doc, rows, key) else {
        return String::new();
    };

    let mut value = String::new();
    if let Ok(anchor_selector) = Selector::parse("td a") {
        value = row
            .select(&anchor_selector)
            .flat_map(|a| a.text())
            .collect::<String>();
    }

    if value.trim().is_empty() {
        if let Ok(cell_selector) = Selector::parse("td") {
            value = row
                .select(&cell_selector)
                .last()
                .map(|cell| cell.text().collect::<String>())
                .unwrap_or_default();
        }
    }

    let value = value.trim();
    if is_placeholder(value) {
        return String::new();
    }
    value.to_string()
}

/// Look up a multi-valued field (genres, tags) by its row key.
///
/// Every anchor in the winning row contributes one entry, in document order.
pub fn table_values(doc: &Html, rows: &str, key: &str) -> Vec<String> {
    let Some(row) = matching_row(doc, rows, key) else {
        return Vec::new();
    };
    let Ok(anchor_selector) = Selector::parse("td a") else {
        return Vec::new();
    };

    row.select(&anchor_selector)
        .map(|a| a.text().collect::<String>().trim().to_string())
        .collect()
}

/// Concatenated, trimmed text of every element matching `css`
pub fn select_text(doc: &Html, css: &str) -> String {
    match Selector::parse(css) {
        Ok(selector) => doc
            .select(&selector)
            .flat_map(|el| el.text())
            .collect::<String>()
            .trim()
            .to_string(),
        Err(_) => String::new(),
    }
}

/// Attribute value of the first element matching `css`
pub fn select_attr(doc: &Html, css: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    doc.select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|v| v.to_string())
}

/// Whether any element matches `css`
pub fn exists(doc: &Html, css: &str) -> bool {
    Selector::parse(css)
        .map(|selector| doc.select(&selector).next().is_some())
        .unwrap_or(false)
}

/// Trimmed text of every element matching `css`, in document order
pub fn select_texts(doc: &Html, css: &str) -> Vec<String> {
    match Selector::parse(css) {
        Ok(selector) => doc
            .select(&selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect(),
        Err(_) => Vec::new(),
    }
}
