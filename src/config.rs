use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::http::SessionCookie;
use crate::poster::{DEFAULT_POSTER_RATIO, FALLBACK_POSTER_WIDTH};
use crate::scrapers::BackendKind;

/// Configuration for the catalog scraper
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where videos are picked up from
    pub input: InputConfig,

    /// Where organized records are written
    pub output: OutputConfig,

    /// Poster cropping conventions
    pub poster: PosterConfig,

    /// HTTP client settings
    pub http: HttpConfig,

    /// Backend priority and per-site options
    pub scrapers: ScrapersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory scanned (non-recursively) for videos
    pub path: PathBuf,

    /// Video extensions, compared case-insensitively, without the dot
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base directory for organized records
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PosterConfig {
    /// Poster height/width ratio
    pub ratio: f64,

    /// Crop width used when the cover cannot be decoded
    pub fallback_width: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapersConfig {
    /// Backends in the order they are tried for each file
    pub priority: Vec<BackendKind>,

    pub dmm: DmmConfig,
}

/// Options for the DMM backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DmmConfig {
    /// Search page URL; `{query}` is replaced by the encoded query
    pub search_url: String,

    /// Performer listing URL; `{cid}` is replaced by the content id
    pub performer_url: String,

    /// Age verification cookie
    pub cookie: CookieConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,

    /// Lifetime of a freshly issued cookie in seconds
    pub ttl_seconds: i64,
}

impl CookieConfig {
    /// Issue a cookie for one resolution attempt
    pub fn issue(&self) -> SessionCookie {
        SessionCookie::new(&self.name, &self.value, &self.domain, &self.path, self.ttl_seconds)
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./input"),
            extensions: vec![
                "wmv".to_string(),
                "mp4".to_string(),
                "avi".to_string(),
                "mkv".to_string(),
            ],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./output"),
        }
    }
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            ratio: DEFAULT_POSTER_RATIO,
            fallback_width: FALLBACK_POSTER_WIDTH,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for ScrapersConfig {
    fn default() -> Self {
        Self {
            priority: vec![BackendKind::Dmm],
            dmm: DmmConfig::default(),
        }
    }
}

impl Default for DmmConfig {
    fn default() -> Self {
        Self {
            search_url: "https://www.dmm.co.jp/mono/dvd/-/search/=/searchstr={query}/".to_string(),
            performer_url: "https://www.dmm.co.jp/mono/dvd/-/detail/performer/=/cid={cid}/"
                .to_string(),
            cookie: CookieConfig::default(),
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "age_check_done".to_string(),
            value: "1".to_string(),
            domain: "dmm.co.jp".to_string(),
            path: "/".to_string(),
            ttl_seconds: 3600,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.apply_env();
        config.validate()?;

        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Override paths from `CATALOG_SCRAPER_INPUT` / `CATALOG_SCRAPER_OUTPUT`
    pub fn apply_env(&mut self) {
        if let Ok(input) = std::env::var("CATALOG_SCRAPER_INPUT") {
            self.input.path = PathBuf::from(input);
        }

        if let Ok(output) = std::env::var("CATALOG_SCRAPER_OUTPUT") {
            self.output.path = PathBuf::from(output);
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.poster.ratio > 0.0) {
            return Err(anyhow!("poster.ratio must be greater than 0"));
        }

        if self.input.extensions.is_empty() {
            return Err(anyhow!("input.extensions must not be empty"));
        }

        if self.scrapers.priority.is_empty() {
            return Err(anyhow!("scrapers.priority must list at least one backend"));
        }

        Ok(())
    }

    /// Whether `path` has one of the configured video extensions
    pub fn is_video(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.input
                    .extensions
                    .iter()
                    .any(|allowed| allowed.trim_start_matches('.').to_lowercase() == ext)
            })
            .unwrap_or(false)
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Catalog Scraper Configuration:\n\
            - Input Directory: {}\n\
            - Output Directory: {}\n\
            - Extensions: {}\n\
            - Backends: {:?}\n\
            - Poster Ratio: {} (fallback width {}px)",
            self.input.path.display(),
            self.output.path.display(),
            self.input.extensions.join(", "),
            self.scrapers.priority,
            self.poster.ratio,
            self.poster.fallback_width
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_input_dir(mut self, dir: PathBuf) -> Self {
        self.config.input.path = dir;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.path = dir;
        self
    }

    pub fn with_poster_ratio(mut self, ratio: f64) -> Self {
        self.config.poster.ratio = ratio;
        self
    }

    pub fn with_fallback_width(mut self, width: u32) -> Self {
        self.config.poster.fallback_width = width;
        self
    }

    pub fn with_backends(mut self, backends: Vec<BackendKind>) -> Self {
        self.config.scrapers.priority = backends;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
