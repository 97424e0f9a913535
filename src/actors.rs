/// Cast list resolution
///
/// Detail pages show a truncated cast list when a title has many performers,
/// together with a "show more" link. When that link is present the full list
/// has to come from the separate performer listing page.
use crate::extract;
use scraper::Html;

/// How the cast list for a detail page has to be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorMode {
    /// Names are all present in the detail page
    Inline,
    /// Names come from a secondary performer listing fetch
    Paginated,
}

/// Selectors used to locate cast information on a site
#[derive(Debug, Clone)]
pub struct ActorSelectors {
    /// The "show more performers" affordance
    pub show_more: String,
    /// Anchors in the inline cast container
    pub inline: String,
    /// Anchors on the performer listing page
    pub listing: String,
}

/// Choose the mode by presence of the "show more" affordance, regardless of
/// how many names are already inline
pub fn actor_mode(doc: &Html, selectors: &ActorSelectors) -> ActorMode {
    if extract::exists(doc, &selectors.show_more) {
        ActorMode::Paginated
    } else {
        ActorMode::Inline
    }
}

/// Names from the detail page's cast container, in document order
pub fn inline_actors(doc: &Html, selectors: &ActorSelectors) -> Vec<String> {
    extract::select_texts(doc, &selectors.inline)
}

/// Names from a performer listing page, in document order
pub fn listing_actors(listing: &Html, selectors: &ActorSelectors) -> Vec<String> {
    extract::select_texts(listing, &selectors.listing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors() -> ActorSelectors {
        ActorSelectors {
            show_more: "a[id=\"a_performer\"]".to_string(),
            inline: "#performer a".to_string(),
            listing: "a[href^='/mono/dvd/-/list/=/article=actress/id=']".to_string(),
        }
    }

    #[test]
    fn test_inline_mode_without_show_more() {
        let doc = Html::parse_document(
            "<span id=\"performer\"><a href=\"/a/1\">Alpha</a><a href=\"/a/2\">Beta</a></span>",
        );
        assert_eq!(actor_mode(&doc, &selectors()), ActorMode::Inline);
        assert_eq!(inline_actors(&doc, &selectors()), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_show_more_forces_paginated_mode() {
        let doc = Html::parse_document(
            "<span id=\"performer\"><a href=\"/a/1\">Alpha</a>\
             <a href=\"#\" id=\"a_performer\">▼すべて表示する</a></span>",
        );
        assert_eq!(actor_mode(&doc, &selectors()), ActorMode::Paginated);
    }

    #[test]
    fn test_listing_keeps_order_and_duplicates() {
        let listing = Html::parse_document(
            "<a href=\"/mono/dvd/-/list/=/article=actress/id=1/\">Alpha</a>\
             <a href=\"/other/\">Not a performer</a>\
             <a href=\"/mono/dvd/-/list/=/article=actress/id=2/\">Gamma</a>\
             <a href=\"/mono/dvd/-/list/=/article=actress/id=1/\">Alpha</a>",
        );
        assert_eq!(
            listing_actors(&listing, &selectors()),
            vec!["Alpha", "Gamma", "Alpha"]
        );
    }
}
