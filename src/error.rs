use std::path::PathBuf;

/// Result type for scraping and placement operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Error types raised while resolving a file against a catalog backend
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("record not found for query: {0}")]
    RecordNotFound(String),

    #[error("no result link matches query {query}: {hrefs:?}")]
    NoMatchingDetail { query: String, hrefs: Vec<String> },

    #[error("field is empty: {0}")]
    FieldEmpty(&'static str),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("source file missing: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("no free disc index for {identifier} in {}", .dir.display())]
    PlacementExhausted { identifier: String, dir: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        ScrapeError::Network(err.to_string())
    }
}
