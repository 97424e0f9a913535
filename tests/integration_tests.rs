use async_trait::async_trait;
use catalog_scraper::{
    ConfigBuilder, FileOutcome, Fetcher, Processor, Result, ScrapeError, SessionCookie,
};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const SEARCH: &str = "https://www.dmm.co.jp/mono/dvd/-/search/=/searchstr=abc00123/";
const DETAIL: &str = "https://www.dmm.co.jp/mono/dvd/-/detail/=/cid=abc00123/";
const COVER: &str = "https://pics.dmm.co.jp/mono/movie/adult/abc00123/abc00123pl.jpg";

/// In-memory catalog site
#[derive(Default)]
struct FixtureSite {
    pages: HashMap<String, String>,
    files: HashMap<String, Vec<u8>>,
}

impl FixtureSite {
    fn catalog() -> Self {
        let mut site = Self::default();
        site.pages.insert(SEARCH.to_string(), search_page());
        site.pages.insert(DETAIL.to_string(), detail_page());
        site.files.insert(COVER.to_string(), cover_jpeg(800, 538));
        site
    }
}

#[async_trait]
impl Fetcher for FixtureSite {
    async fn get_text(&self, url: &str, cookie: Option<&SessionCookie>) -> Result<String> {
        if cookie.map(|c| c.applies_to(url)) != Some(true) {
            return Err(ScrapeError::Network(format!("age check required: {}", url)));
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::Network(format!("HTTP error 404 Not Found: {}", url)))
    }

    async fn download(
        &self,
        url: &str,
        dest: &Path,
        _cookie: Option<&SessionCookie>,
        progress: &mut (dyn FnMut(u64, u64) + Send),
    ) -> Result<u64> {
        let bytes = self
            .files
            .get(url)
            .ok_or_else(|| ScrapeError::Network(format!("HTTP error 404 Not Found: {}", url)))?;
        let total = bytes.len() as u64;
        for (index, chunk) in bytes.chunks(1024).enumerate() {
            progress((index * 1024 + chunk.len()) as u64, total);
        }
        tokio::fs::write(dest, bytes).await?;
        Ok(total)
    }
}

fn search_page() -> String {
    r#"<html><body><ul id="list">
         <li><p class="tmb"><a href="/mono/dvd/-/detail/=/cid=abc00122/">other</a></p></li>
         <li><p class="tmb"><a href="/mono/dvd/-/detail/=/cid=abc00123/">match</a></p></li>
       </ul></body></html>"#
        .to_string()
}

fn detail_page() -> String {
    r#"<html><head><meta property="og:image" content="https://pics.dmm.co.jp/mono/movie/adult/abc00123/abc00123ps.jpg"></head>
       <body>
         <h1 id="title">Sample Title</h1>
         <table class="mg-b20">
           <tr><td>発売日：</td><td>2021/03/04</td></tr>
           <tr><td>収録時間：</td><td>120分</td></tr>
           <tr><td>出演者：</td><td><span id="performer"><a href="/a/1">Alpha</a><a href="/a/2">Beta</a></span></td></tr>
           <tr><td>監督：</td><td><a href="/d/1">Director</a></td></tr>
           <tr><td>シリーズ：</td><td>----</td></tr>
           <tr><td>メーカー：</td><td><a href="/m/1">Maker</a></td></tr>
           <tr><td>レーベル：</td><td><a href="/l/1">Label</a></td></tr>
           <tr><td>ジャンル：</td><td><a href="/g/1">Drama</a></td></tr>
           <tr><td>品番：</td><td>abc00123</td></tr>
         </table>
         <div class="mg-b20 lh4"><p class="mg-b20">Plot text.</p></div>
       </body></html>"#
        .to_string()
}

fn cover_jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| image::Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .unwrap();
    bytes
}

fn processor(input: &Path, output: &Path, site: FixtureSite) -> Processor {
    let config = ConfigBuilder::new()
        .with_input_dir(input.to_path_buf())
        .with_output_dir(output.to_path_buf())
        .build();
    Processor::with_fetcher(config, Arc::new(site))
}

#[tokio::test]
async fn test_end_to_end_organizes_video() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let source = input.path().join("ABC-00123.mp4");
    std::fs::write(&source, b"video bytes").unwrap();

    let result = processor(input.path(), output.path(), FixtureSite::catalog())
        .process_directory()
        .await
        .unwrap();

    assert_eq!(result.total, 1);
    assert_eq!(result.organized, 1);
    assert_eq!(result.failed, 0);
    assert_eq!(result.skipped, 0);

    let dir = output.path().join("ABC-123");
    let placed = dir.join("ABC-123.mp4");
    assert_eq!(result.outcomes[0].1, FileOutcome::Organized(placed.clone()));
    assert!(!source.exists());
    assert_eq!(std::fs::read(&placed).unwrap(), b"video bytes");

    assert!(dir.join("ABC-123-fanart.jpg").exists());
    assert_eq!(
        image::image_dimensions(dir.join("ABC-123-poster.jpg")).unwrap(),
        (378, 538)
    );

    let nfo = std::fs::read_to_string(dir.join("ABC-123.nfo")).unwrap();
    assert!(nfo.contains("<title>ABC-123 Sample Title</title>"));
    assert!(nfo.contains("<premiered>2021-03-04</premiered>"));
    assert!(nfo.contains("<year>2021</year>"));
    assert!(nfo.contains("<name>Alpha</name>"));
    assert!(nfo.contains("<name>Beta</name>"));
    assert!(nfo.contains(&format!("<website>{}</website>", DETAIL)));
    assert!(nfo.contains(&format!("<cover>{}</cover>", COVER)));
}

#[tokio::test]
async fn test_existing_video_is_not_overwritten() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    std::fs::write(input.path().join("abc00123.mkv"), b"second").unwrap();

    let dir = output.path().join("ABC-123");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("ABC-123.mkv"), b"first").unwrap();

    let result = processor(input.path(), output.path(), FixtureSite::catalog())
        .process_directory()
        .await
        .unwrap();

    assert_eq!(result.organized, 1);
    assert_eq!(std::fs::read(dir.join("ABC-123.mkv")).unwrap(), b"first");
    assert_eq!(std::fs::read(dir.join("ABC-123-cd2.mkv")).unwrap(), b"second");
}

#[tokio::test]
async fn test_unrecognized_and_unsupported_files_are_skipped() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    std::fs::write(input.path().join("holiday.mp4"), b"").unwrap();
    std::fs::write(input.path().join("FC2-PPV-1234567.mp4"), b"").unwrap();
    std::fs::write(input.path().join("ABC-00123.txt"), b"").unwrap();

    let result = processor(input.path(), output.path(), FixtureSite::catalog())
        .process_directory()
        .await
        .unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.skipped, 2);
    assert!(input.path().join("ABC-00123.txt").exists());
    assert!(std::fs::read_dir(output.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_missing_detail_page_fails_and_keeps_source() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let source = input.path().join("ABC-00123.mp4");
    std::fs::write(&source, b"video").unwrap();

    let mut site = FixtureSite::catalog();
    site.pages.remove(DETAIL);

    let result = processor(input.path(), output.path(), site)
        .process_directory()
        .await
        .unwrap();

    assert_eq!(result.failed, 1);
    assert_eq!(result.outcomes[0].1, FileOutcome::Failed);
    assert!(source.exists());
    assert!(!output.path().join("ABC-123").exists());
}

#[tokio::test]
async fn test_missing_cover_fails_after_directory_creation() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let source = input.path().join("ABC-00123.mp4");
    std::fs::write(&source, b"video").unwrap();

    let mut site = FixtureSite::catalog();
    site.files.clear();

    let result = processor(input.path(), output.path(), site)
        .process_directory()
        .await
        .unwrap();

    assert_eq!(result.failed, 1);
    assert!(source.exists());
    assert!(!output.path().join("ABC-123").join("ABC-123.nfo").exists());
}
