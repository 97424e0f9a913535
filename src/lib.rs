/// Catalog Scraper
///
/// Resolves local video files against an online catalog, writes cover,
/// poster and `.nfo` sidecars, and moves each video into a per-title
/// library folder.

pub mod actors;
pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod nfo;
pub mod number;
pub mod placement;
pub mod poster;
pub mod processing;
pub mod query;
pub mod scrapers;
pub mod search;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Result, ScrapeError};
pub use crate::http::{Fetcher, HttpClient, SessionCookie};
pub use crate::nfo::MovieNfo;
pub use crate::number::{format_number, FormattedNumber};
pub use crate::poster::{poster_geometry, Geometry};
pub use crate::processing::{FileOutcome, ProcessingResult, Processor};
pub use crate::query::{resolve_query, QueryShape, ResolvedQuery};
pub use crate::scrapers::{create_scraper, BackendKind, CatalogRecord, Scraper};
