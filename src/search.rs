/// Two-phase resolution: search results page, then the matching detail page
use crate::error::{Result, ScrapeError};
use crate::number::FormattedNumber;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

/// Width the catalog pads numeric suffixes to in its content ids
const SEARCH_PAD_WIDTH: usize = 5;

/// Turn `label-123` into the catalog's compact `label00123` form.
///
/// Queries without a label/number separator are returned unchanged.
pub fn padded_search_query(query: &str) -> String {
    let Ok(re) = Regex::new(r"^([A-Za-z]+)-(\d+)$") else {
        return query.to_string();
    };

    match re.captures(query) {
        Some(captures) => format!(
            "{}{:0>width$}",
            &captures[1],
            &captures[2],
            width = SEARCH_PAD_WIDTH
        ),
        None => query.to_string(),
    }
}

/// Collect every result link's href in document order, resolved against the
/// search page URL
pub fn collect_result_links(doc: &Html, links: &str, base_url: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(links) else {
        return Vec::new();
    };
    let base = Url::parse(base_url).ok();

    doc.select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| match base.as_ref().and_then(|b| b.join(href).ok()) {
            Some(resolved) => resolved.to_string(),
            None => href.to_string(),
        })
        .collect()
}

/// Content id carried by an href's trailing path segment.
///
/// `https://www.dmm.co.jp/mono/dvd/-/detail/=/cid=abc00123/?i3_ref=search`
/// yields `abc00123`.
pub fn trailing_segment(href: &str) -> String {
    let path = match Url::parse(href) {
        Ok(url) => url.path().to_string(),
        Err(_) => href.split(['?', '#']).next().unwrap_or("").to_string(),
    };

    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("");

    segment.rsplit('=').next().unwrap_or(segment).to_string()
}

fn alphanumeric_lower(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Whether the href's content id is exactly `query`, in either its unpadded
/// or its padded search form
pub fn href_is_exact(href: &str, query: &str) -> bool {
    let segment = alphanumeric_lower(&trailing_segment(href));
    !segment.is_empty()
        && (segment == alphanumeric_lower(query)
            || segment == alphanumeric_lower(&padded_search_query(query)))
}

/// Whether a result href points at the detail page for `query`, allowing
/// distributor prefixes and differently padded numbers
pub fn href_matches_query(href: &str, query: &str) -> bool {
    let segment = trailing_segment(href);
    if segment.is_empty() {
        return false;
    }

    match (FormattedNumber::parse(&segment), FormattedNumber::parse(query)) {
        (Some(found), Some(wanted)) => found.same_entry(&wanted),
        _ => alphanumeric_lower(&segment) == alphanumeric_lower(query),
    }
}

/// Pick the detail page for `query` from the search results.
///
/// An href whose content id equals the query wins over one that only shares
/// its label and number. Within each pass the first href wins.
pub fn select_detail(hrefs: &[String], query: &str) -> Result<String> {
    if hrefs.is_empty() {
        return Err(ScrapeError::RecordNotFound(query.to_string()));
    }

    let selected = hrefs
        .iter()
        .find(|href| href_is_exact(href, query))
        .or_else(|| hrefs.iter().find(|href| href_matches_query(href, query)));

    match selected {
        Some(href) => {
            debug!("Selected detail page {} for query {}", href, query);
            Ok(href.clone())
        }
        None => Err(ScrapeError::NoMatchingDetail {
            query: query.to_string(),
            hrefs: hrefs.to_vec(),
        }),
    }
}
