/// Filename to search query resolution
use crate::scrapers::BackendKind;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Catalog identifier shapes recognized in filenames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryShape {
    /// Label + number, e.g. `ABC-123`
    Standard,
    /// FC2 PPV uploads, e.g. `FC2-PPV-1234567`
    Fc2,
}

/// Search query for a file and the backends to try for it, in priority order
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    /// Normalized query; empty means the file should be skipped
    pub query: String,
    pub shape: Option<QueryShape>,
    pub backends: Vec<BackendKind>,
}

impl ResolvedQuery {
    fn skip() -> Self {
        Self {
            query: String::new(),
            shape: None,
            backends: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }
}

/// Lowercase the stem and drop bracketed tags like `[site]` or `【HD】`
fn clean_stem(stem: &str) -> String {
    let lower = stem.to_lowercase();
    match Regex::new(r"\[[^\]]*\]|【[^】]*】") {
        Ok(re) => re.replace_all(&lower, " ").to_string(),
        Err(_) => lower,
    }
}

/// Normalize a filename stem into a query and its shape
pub fn normalize_query(stem: &str) -> Option<(String, QueryShape)> {
    let name = clean_stem(stem);

    if let Ok(fc2) = Regex::new(r"fc2[-_ ]?ppv[-_ ]?(\d{5,8})") {
        if let Some(captures) = fc2.captures(&name) {
            return Some((format!("fc2-ppv-{}", &captures[1]), QueryShape::Fc2));
        }
    }

    let standard = Regex::new(r"(?:^|[^a-z])([a-z]{2,6})[-_ ]?(\d{2,6})(?:\D|$)").ok()?;
    let captures = standard.captures(&name)?;
    let label = &captures[1];
    let digits = &captures[2];

    // five digits is already the catalog's compact content id; shorter
    // numbers keep a separator so the search phase can pad them
    let query = if digits.len() >= 5 {
        format!("{}{}", label, digits)
    } else {
        format!("{}-{}", label, digits)
    };

    Some((query, QueryShape::Standard))
}

/// Resolve a filename stem (extension already stripped) against the
/// configured backend priority list.
///
/// An empty query means the name has no recognizable catalog shape.
pub fn resolve_query(stem: &str, priority: &[BackendKind]) -> ResolvedQuery {
    let Some((query, shape)) = normalize_query(stem) else {
        debug!("No catalog identifier in {}", stem);
        return ResolvedQuery::skip();
    };

    let backends = priority
        .iter()
        .copied()
        .filter(|backend| backend.supports(shape))
        .collect();

    ResolvedQuery {
        query,
        shape: Some(shape),
        backends,
    }
}
