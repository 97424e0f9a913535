use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::ScrapeError;
use crate::http::{Fetcher, HttpClient, SessionCookie};
use crate::nfo::MovieNfo;
use crate::placement;
use crate::poster::{self, Geometry};
use crate::query;
use crate::scrapers::{create_scraper, Scraper};

/// What happened to a single input file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FileOutcome {
    /// Moved into the library at the given path
    Organized(PathBuf),
    /// No recognizable identifier or no backend for it
    Skipped,
    /// Every backend failed
    Failed,
}

/// Overall run results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub total: usize,
    pub organized: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_time: Duration,
    pub outcomes: Vec<(PathBuf, FileOutcome)>,
}

/// Paths of the artifacts written for one record
#[derive(Debug, Clone)]
struct RecordPaths {
    dir: PathBuf,
    cover: PathBuf,
    poster: PathBuf,
    nfo: PathBuf,
}

impl RecordPaths {
    fn new(output_root: &Path, number: &str) -> Self {
        let dir = output_root.join(number);
        Self {
            cover: dir.join(format!("{}-fanart.jpg", number)),
            poster: dir.join(format!("{}-poster.jpg", number)),
            nfo: dir.join(format!("{}.nfo", number)),
            dir,
        }
    }
}

/// Sequential processor: one file at a time, backends in priority order
pub struct Processor {
    config: Config,
    fetcher: Arc<dyn Fetcher>,
}

impl Processor {
    pub fn new(config: Config) -> Result<Self> {
        let client = HttpClient::new(&config.http.user_agent, config.http.timeout_seconds)
            .context("Failed to build HTTP client")?;
        Ok(Self::with_fetcher(config, Arc::new(client)))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Self {
        info!("🔧 Initializing Processor with backends {:?}", config.scrapers.priority);
        Self { config, fetcher }
    }

    /// List video files directly inside `dir`, sorted by name
    pub async fn discover_videos(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut videos = Vec::new();
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .with_context(|| format!("Failed to read input directory {}", dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            // follows symlinks, so linked videos are picked up
            match tokio::fs::metadata(&path).await {
                Ok(metadata) if metadata.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    warn!("Skipping unreadable entry {}: {}", path.display(), e);
                    continue;
                }
            }
            if self.config.is_video(&path) {
                videos.push(path);
            }
        }

        videos.sort();
        Ok(videos)
    }

    /// Process every video in the configured input directory
    pub async fn process_directory(&self) -> Result<ProcessingResult> {
        let start_time = Instant::now();
        let input_dir = self.config.input.path.clone();

        info!("🚀 Starting catalog scrape...");
        info!("📁 Input: {}", input_dir.display());
        info!("📂 Output: {}", self.config.output.path.display());

        let videos = self.discover_videos(&input_dir).await?;
        if videos.is_empty() {
            warn!("No videos found in {}", input_dir.display());
        } else {
            info!("📹 Found {} videos to process", videos.len());
        }

        let mut outcomes = Vec::with_capacity(videos.len());
        for (index, video) in videos.into_iter().enumerate() {
            info!("📹 Check file {}: {}", index + 1, video.display());
            let outcome = self.process_file(&video).await;
            outcomes.push((video, outcome));
        }

        let count = |wanted: fn(&FileOutcome) -> bool| {
            outcomes.iter().filter(|(_, outcome)| wanted(outcome)).count()
        };
        let organized = count(|o| matches!(o, FileOutcome::Organized(_)));
        let failed = count(|o| matches!(o, FileOutcome::Failed));
        let skipped = count(|o| matches!(o, FileOutcome::Skipped));

        Ok(ProcessingResult {
            total: outcomes.len(),
            organized,
            failed,
            skipped,
            total_time: start_time.elapsed(),
            outcomes,
        })
    }

    /// Resolve one file, trying each backend until one completes
    pub async fn process_file(&self, video: &Path) -> FileOutcome {
        let stem = video
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        let resolved = query::resolve_query(stem, &self.config.scrapers.priority);
        if resolved.is_empty() {
            info!("⏭️ No catalog identifier in {}, skipping", stem);
            return FileOutcome::Skipped;
        }
        if resolved.backends.is_empty() {
            info!(
                "⏭️ No configured backend handles {:?} query {}, skipping",
                resolved.shape, resolved.query
            );
            return FileOutcome::Skipped;
        }

        for kind in &resolved.backends {
            let mut scraper = create_scraper(*kind, self.fetcher.clone(), &self.config.scrapers);
            info!("{} capturing query: {}", kind.name(), resolved.query);

            match self.attempt(scraper.as_mut(), &resolved.query, video).await {
                Ok(placed) => return FileOutcome::Organized(placed),
                Err(e) => error!("{} failed for {}: {:#}", kind.name(), stem, e),
            }
        }

        warn!("❌ All backends exhausted for {}", stem);
        FileOutcome::Failed
    }

    /// Run the full pipeline for one file against one backend
    async fn attempt(&self, scraper: &mut dyn Scraper, query: &str, video: &Path) -> Result<PathBuf> {
        let backend = scraper.kind().name();
        let cookie = scraper.session_cookie();

        scraper.fetch_doc(query, &cookie).await?;

        let raw_number = scraper.number();
        if raw_number.is_empty() {
            return Err(ScrapeError::FieldEmpty("number").into());
        }
        let number = scraper.format_number();
        info!("{} get num {} format: {}", backend, raw_number, number);

        let paths = RecordPaths::new(&self.config.output.path, &number);
        info!("{} making output path: {}", backend, paths.dir.display());
        tokio::fs::create_dir_all(&paths.dir)
            .await
            .with_context(|| format!("Failed to create {}", paths.dir.display()))?;

        let record = scraper.record(&cookie).await;

        self.download_cover(backend, &record.cover, &paths.cover, &cookie)
            .await?;
        let geometry = self.make_poster(&paths.cover, &paths.poster).await?;
        debug!("Poster geometry for {}: {:?}", number, geometry);

        info!("{} writing nfo file: {}", backend, paths.nfo.display());
        MovieNfo::from_record(&record, &number).save(&paths.nfo).await?;

        info!("{} moving video file to: {}", backend, paths.dir.display());
        let placed = placement::place_file(video, &paths.dir, &number, 1).await?;

        info!("-------- Done: {} --------", number);
        Ok(placed)
    }

    async fn download_cover(
        &self,
        backend: &str,
        url: &str,
        dest: &Path,
        cookie: &SessionCookie,
    ) -> Result<()> {
        if url.is_empty() {
            return Err(ScrapeError::FieldEmpty("cover").into());
        }

        let label = format!(
            "{} downloading {}",
            backend,
            dest.file_name().and_then(|n| n.to_str()).unwrap_or_default()
        );
        let mut last_decile = None;
        let mut progress = move |current: u64, total: u64| {
            if total == 0 {
                return;
            }
            let percent = current as f64 / total as f64 * 100.0;
            let decile = (percent / 10.0) as u64;
            if last_decile != Some(decile) {
                last_decile = Some(decile);
                info!("{} ... {:.1}%", label, percent);
            }
        };

        let bytes = self
            .fetcher
            .download(url, dest, Some(cookie), &mut progress)
            .await?;
        debug!("Downloaded {} bytes to {}", bytes, dest.display());
        Ok(())
    }

    /// Crop the poster off the cover on the blocking pool
    async fn make_poster(&self, cover: &Path, poster_path: &Path) -> Result<Geometry> {
        let cover = cover.to_path_buf();
        let poster_path = poster_path.to_path_buf();
        let ratio = self.config.poster.ratio;
        let fallback_width = self.config.poster.fallback_width;

        let geometry = tokio::task::spawn_blocking(move || -> crate::error::Result<Geometry> {
            let geometry = poster::cover_geometry(&cover, ratio, fallback_width);
            poster::crop_and_save(&cover, &poster_path, geometry)?;
            Ok(geometry)
        })
        .await?
        .context("Crop image failed")?;

        Ok(geometry)
    }
}
