/// DMM mono/dvd catalog scraper
use super::{BackendKind, Scraper};
use crate::actors::{self, ActorMode, ActorSelectors};
use crate::config::DmmConfig;
use crate::error::Result;
use crate::extract;
use crate::http::{fetch_document, Fetcher, SessionCookie};
use crate::search;
use async_trait::async_trait;
use regex::Regex;
use scraper::Html;
use std::sync::Arc;
use tracing::{debug, info, warn};

const RESULT_LINKS: &str = "#list li .tmb a";
const TABLE_ROWS: &str = "table[class=\"mg-b20\"] tr";
const TITLE: &str = "h1#title";
const PLOT: &str = "div[class=\"mg-b20 lh4\"] p[class=\"mg-b20\"]";
const RATING: &str = "p.dcd-review__average strong";
const COVER: &str = "meta[property=\"og:image\"]";

const KEY_DIRECTOR: &str = "監督";
const KEY_RUNTIME: &str = "収録時間";
const KEY_GENRE: &str = "ジャンル";
const KEY_MAKER: &str = "メーカー";
const KEY_LABEL: &str = "レーベル";
const KEY_NUMBER: &str = "品番";
const KEY_SERIES: &str = "シリーズ";
const KEY_RELEASE: &str = "発売日";
const KEY_DELIVERY: &str = "配信開始日";

/// DMM scraper holding the most recently fetched document
pub struct DmmScraper {
    fetcher: Arc<dyn Fetcher>,
    config: DmmConfig,
    doc: Option<Html>,
    detail_url: Option<String>,
}

impl DmmScraper {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: DmmConfig) -> Self {
        Self {
            fetcher,
            config,
            doc: None,
            detail_url: None,
        }
    }

    fn search_url(&self, query: &str) -> String {
        self.config
            .search_url
            .replace("{query}", &urlencoding::encode(query))
    }

    fn performer_url(&self, cid: &str) -> String {
        self.config
            .performer_url
            .replace("{cid}", &urlencoding::encode(cid))
    }

    fn actor_selectors() -> ActorSelectors {
        ActorSelectors {
            show_more: "a[id=\"a_performer\"]".to_string(),
            inline: "#performer a".to_string(),
            listing: "a[href^='/mono/dvd/-/list/=/article=actress/id=']".to_string(),
        }
    }

    fn table_value(&self, key: &str) -> String {
        self.doc
            .as_ref()
            .map(|doc| extract::table_value(doc, TABLE_ROWS, key))
            .unwrap_or_default()
    }

    fn text(&self, css: &str) -> String {
        self.doc
            .as_ref()
            .map(|doc| extract::select_text(doc, css))
            .unwrap_or_default()
    }

    async fn fetch_all_actors(&self, cookie: &SessionCookie) -> Vec<String> {
        let url = self.performer_url(&self.number());
        info!("🎭 Fetching performer listing: {}", url);

        match fetch_document(self.fetcher.as_ref(), &url, Some(cookie)).await {
            Ok(listing) => actors::listing_actors(&listing, &Self::actor_selectors()),
            Err(e) => {
                warn!("Failed to fetch performer listing {}: {}", url, e);
                Vec::new()
            }
        }
    }
}

#[async_trait(?Send)]
impl Scraper for DmmScraper {
    fn kind(&self) -> BackendKind {
        BackendKind::Dmm
    }

    fn session_cookie(&self) -> SessionCookie {
        self.config.cookie.issue()
    }

    async fn fetch_doc(&mut self, query: &str, cookie: &SessionCookie) -> Result<()> {
        let search_query = search::padded_search_query(query);
        let url = self.search_url(&search_query);
        info!("🔍 Searching {}: {}", self.kind().name(), url);

        let results = fetch_document(self.fetcher.as_ref(), &url, Some(cookie)).await?;
        let hrefs = search::collect_result_links(&results, RESULT_LINKS, &url);
        self.doc = Some(results);
        self.detail_url = None;
        debug!("Found {} result links", hrefs.len());

        let detail = search::select_detail(&hrefs, query)?;
        info!("📄 Fetching detail page: {}", detail);

        let doc = fetch_document(self.fetcher.as_ref(), &detail, Some(cookie)).await?;
        self.doc = Some(doc);
        self.detail_url = Some(detail);
        Ok(())
    }

    fn title(&self) -> String {
        self.text(TITLE)
    }

    fn plot(&self) -> String {
        self.text(PLOT)
    }

    fn director(&self) -> String {
        self.table_value(KEY_DIRECTOR)
    }

    fn rating(&self) -> String {
        self.text(RATING)
    }

    fn runtime(&self) -> String {
        self.table_value(KEY_RUNTIME)
    }

    fn tags(&self) -> Vec<String> {
        self.doc
            .as_ref()
            .map(|doc| extract::table_values(doc, TABLE_ROWS, KEY_GENRE))
            .unwrap_or_default()
    }

    fn maker(&self) -> String {
        self.table_value(KEY_MAKER)
    }

    fn label(&self) -> String {
        self.table_value(KEY_LABEL)
    }

    fn series(&self) -> String {
        self.table_value(KEY_SERIES)
    }

    fn number(&self) -> String {
        self.table_value(KEY_NUMBER)
    }

    fn cover(&self) -> String {
        self.doc
            .as_ref()
            .and_then(|doc| extract::select_attr(doc, COVER, "content"))
            .map(|img| img.replacen("ps.jpg", "pl.jpg", 1))
            .unwrap_or_default()
    }

    fn premiered(&self) -> String {
        let mut released = self.table_value(KEY_RELEASE);
        if released.is_empty() {
            released = self.table_value(KEY_DELIVERY);
        }
        released.replace('/', "-")
    }

    fn year(&self) -> String {
        let premiered = self.premiered();
        Regex::new(r"\d{4}")
            .ok()
            .and_then(|re| re.find(&premiered).map(|m| m.as_str().to_string()))
            .unwrap_or_default()
    }

    fn website(&self) -> String {
        self.detail_url.clone().unwrap_or_default()
    }

    async fn actors(&self, cookie: &SessionCookie) -> Vec<String> {
        let Some(doc) = self.doc.as_ref() else {
            return Vec::new();
        };
        let selectors = Self::actor_selectors();

        match actors::actor_mode(doc, &selectors) {
            ActorMode::Inline => actors::inline_actors(doc, &selectors),
            ActorMode::Paginated => self.fetch_all_actors(cookie).await,
        }
    }
}
