/// HTTP boundary: page fetching, cover downloads and the session cookie
use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, COOKIE};
use reqwest::Client;
use scraper::Html;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

/// Cookie asserting age verification, attached per request
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub expires: DateTime<Utc>,
}

impl SessionCookie {
    /// Create a cookie that expires `ttl_seconds` from now
    pub fn new(name: &str, value: &str, domain: &str, path: &str, ttl_seconds: i64) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            domain: domain.trim_start_matches('.').to_string(),
            path: path.to_string(),
            expires: Utc::now() + ChronoDuration::seconds(ttl_seconds),
        }
    }

    /// Whether the cookie would be sent to `url` by a browser
    pub fn applies_to(&self, url: &str) -> bool {
        if self.expires <= Utc::now() {
            return false;
        }
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };

        let domain = self.domain.to_lowercase();
        let host = host.to_lowercase();
        let domain_ok = host == domain || host.ends_with(&format!(".{}", domain));
        let path_ok = path_matches(parsed.path(), &self.path);

        domain_ok && path_ok
    }

    /// `name=value` form for the Cookie header
    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Cookie path match: equal, or a prefix ending at a `/` boundary
fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/'))
}

/// Source of catalog pages and binary downloads
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and return the decoded body
    async fn get_text(&self, url: &str, cookie: Option<&SessionCookie>) -> Result<String>;

    /// Stream `url` into `dest`, reporting `(transferred, total)` after every
    /// chunk. `total` is 0 when the server does not announce a length.
    async fn download(
        &self,
        url: &str,
        dest: &Path,
        cookie: Option<&SessionCookie>,
        progress: &mut (dyn FnMut(u64, u64) + Send),
    ) -> Result<u64>;
}

/// Fetch `url` and parse it into a navigable document
pub async fn fetch_document(
    fetcher: &dyn Fetcher,
    url: &str,
    cookie: Option<&SessionCookie>,
) -> Result<Html> {
    let body = fetcher.get_text(url, cookie).await?;
    if body.trim().is_empty() {
        return Err(ScrapeError::Parse(format!("empty document: {}", url)));
    }
    debug!("📄 Downloaded {} characters from {}", body.len(), url);
    Ok(Html::parse_document(&body))
}

/// reqwest-backed fetcher
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    async fn send(&self, url: &str, cookie: Option<&SessionCookie>) -> Result<reqwest::Response> {
        let mut request = self.client.get(url);
        if let Some(cookie) = cookie.filter(|c| c.applies_to(url)) {
            request = request.header(COOKIE, cookie.header_value());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ScrapeError::Network(format!(
                "HTTP error {}: {}",
                response.status(),
                url
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn get_text(&self, url: &str, cookie: Option<&SessionCookie>) -> Result<String> {
        let response = self.send(url, cookie).await?;
        let bytes = response.bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ScrapeError::Parse(format!("{} is not valid UTF-8: {}", url, e)))
    }

    async fn download(
        &self,
        url: &str,
        dest: &Path,
        cookie: Option<&SessionCookie>,
        progress: &mut (dyn FnMut(u64, u64) + Send),
    ) -> Result<u64> {
        let response = self.send(url, cookie).await?;
        let total = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        let mut file = tokio::fs::File::create(dest).await?;
        let mut transferred = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            transferred += chunk.len() as u64;
            progress(transferred, total);
        }
        file.flush().await?;

        Ok(transferred)
    }
}
