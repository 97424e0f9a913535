pub mod dmm;

use crate::config::ScrapersConfig;
use crate::error::Result;
use crate::http::{Fetcher, SessionCookie};
use crate::number;
use crate::query::QueryShape;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Catalog sites a file can be resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    Dmm,
}

impl BackendKind {
    /// Whether this backend can search for identifiers of `shape`
    pub fn supports(&self, shape: QueryShape) -> bool {
        match self {
            BackendKind::Dmm => matches!(shape, QueryShape::Standard),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Dmm => "DMMScraper",
        }
    }
}

/// Metadata gathered from one detail page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub title: String,
    pub original_title: String,
    pub plot: String,
    pub director: String,
    pub rating: String,
    pub runtime: String,
    pub premiered: String,
    pub year: String,
    pub series: String,
    pub maker: String,
    pub label: String,
    /// Raw catalog number as printed on the page
    pub number: String,
    pub tags: Vec<String>,
    pub actors: Vec<String>,
    pub cover: String,
    pub website: String,
}

/// Capability set of a catalog site.
///
/// `fetch_doc` replaces the scraper's current document; every getter reads
/// that document and returns an empty value when nothing has been fetched.
/// Futures are not `Send`: parsed documents stay on the thread that fetched
/// them.
#[async_trait(?Send)]
pub trait Scraper {
    fn kind(&self) -> BackendKind;

    /// Age verification cookie for one resolution attempt
    fn session_cookie(&self) -> SessionCookie;

    /// Search for `query` and load the matching detail page
    async fn fetch_doc(&mut self, query: &str, cookie: &SessionCookie) -> Result<()>;

    fn title(&self) -> String;
    fn plot(&self) -> String;
    fn director(&self) -> String;
    fn rating(&self) -> String;
    fn runtime(&self) -> String;
    fn tags(&self) -> Vec<String>;
    fn maker(&self) -> String;
    fn label(&self) -> String;
    fn series(&self) -> String;
    fn number(&self) -> String;
    fn cover(&self) -> String;
    fn premiered(&self) -> String;
    fn year(&self) -> String;
    fn website(&self) -> String;

    /// Cast list; may issue a secondary fetch
    async fn actors(&self, cookie: &SessionCookie) -> Vec<String>;

    /// Catalog number in `LABEL-123` form
    fn format_number(&self) -> String {
        number::format_number(&self.number())
    }

    /// Collect every field of the current document
    async fn record(&self, cookie: &SessionCookie) -> CatalogRecord {
        let title = self.title();
        CatalogRecord {
            original_title: title.clone(),
            title,
            plot: self.plot(),
            director: self.director(),
            rating: self.rating(),
            runtime: self.runtime(),
            premiered: self.premiered(),
            year: self.year(),
            series: self.series(),
            maker: self.maker(),
            label: self.label(),
            number: self.number(),
            tags: self.tags(),
            actors: self.actors(cookie).await,
            cover: self.cover(),
            website: self.website(),
        }
    }
}

/// Create a scraper for `kind`
pub fn create_scraper(
    kind: BackendKind,
    fetcher: Arc<dyn Fetcher>,
    config: &ScrapersConfig,
) -> Box<dyn Scraper> {
    match kind {
        BackendKind::Dmm => Box::new(dmm::DmmScraper::new(fetcher, config.dmm.clone())),
    }
}
