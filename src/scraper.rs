use std::path::Path;
use log::{error, info};
use reqwest::header::{HeaderMap, InvalidHeaderValue};
use scraper::Html;
use thiserror::Error;
use url::Url;

use crate::config::ScraperConfig;
use crate::delay_manager::{page_delay, Sleep, ThreadSleep};
use crate::document;
use crate::exporter::{self, ExportError, ExportFormat};
use crate::extractor::{BookExtractor, Extractor, QuoteExtractor};
use crate::fetcher::{default_headers, Fetch, FetchError, HttpFetcher};
use crate::record::{Record, RecordStore};
use crate::retry;

/// Setup failures; everything after construction is reported through the log.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("invalid base URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),
    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// One scraping run against a base URL. Records accumulate across calls.
pub struct Session<F = HttpFetcher, S = ThreadSleep> {
    base_url: String,
    headers: HeaderMap,
    records: RecordStore,
    config: ScraperConfig,
    fetcher: F,
    sleeper: S,
}

impl Session<HttpFetcher, ThreadSleep> {
    pub fn new(base_url: &str, config: ScraperConfig) -> Result<Self, ScraperError> {
        let headers = default_headers(&config.user_agent)?;
        Self::with_headers(base_url, headers, config)
    }

    pub fn with_headers(
        base_url: &str,
        headers: HeaderMap,
        config: ScraperConfig,
    ) -> Result<Self, ScraperError> {
        let fetcher = HttpFetcher::new(headers.clone(), config.timeout)?;
        Session::with_parts(base_url, headers, config, fetcher, ThreadSleep)
    }
}

impl<F: Fetch, S: Sleep> Session<F, S> {
    pub fn with_parts(
        base_url: &str,
        headers: HeaderMap,
        config: ScraperConfig,
        fetcher: F,
        sleeper: S,
    ) -> Result<Self, ScraperError> {
        let base_url = base_url.trim();
        Url::parse(base_url).map_err(|source| ScraperError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;

        Ok(Session {
            base_url: base_url.to_string(),
            headers,
            records: RecordStore::new(),
            config,
            fetcher,
            sleeper,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn try_fetch(&self, url: &str) -> Result<Html, FetchError> {
        info!("Fetching: {}", url);
        let body = self.fetcher.get(url)?;
        info!("Page fetched successfully");
        Ok(document::parse(&body))
    }

    /// `None` on any failure; the cause is logged.
    pub fn fetch_page(&self, url: &str) -> Option<Html> {
        match self.try_fetch(url) {
            Ok(doc) => Some(doc),
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }

    pub fn fetch_with_retries(&self, url: &str, max_attempts: u32) -> Result<Html, FetchError> {
        info!("Fetching with up to {} attempts: {}", max_attempts, url);
        let body = retry::fetch_with_retries(&self.fetcher, &self.sleeper, url, max_attempts)?;
        Ok(document::parse(&body))
    }

    pub fn scrape_with_retries(&self, url: &str, max_attempts: u32) -> Option<Html> {
        match self.fetch_with_retries(url, max_attempts) {
            Ok(doc) => Some(doc),
            Err(e) => {
                error!("Giving up on {}: {}", url, e);
                None
            }
        }
    }

    /// Retry wrapper with `max_retries` from the session config.
    pub fn scrape_with_configured_retries(&self, url: &str) -> Option<Html> {
        self.scrape_with_retries(url, self.config.max_retries)
    }

    /// Walks `{base}/page/{n}/` for the configured number of pages.
    pub fn scrape_quotes(&mut self) -> usize {
        self.scrape_quote_pages(self.config.max_pages)
    }

    /// Stops at `max_pages`, on the first failed fetch, or on the first page
    /// without quote containers. Returns the number of records added.
    pub fn scrape_quote_pages(&mut self, max_pages: u32) -> usize {
        let before = self.records.len();
        let root = self.base_url.trim_end_matches('/').to_string();

        for page in 1..=max_pages {
            let url = format!("{}/page/{}/", root, page);
            let Some(doc) = self.fetch_page(&url) else {
                break;
            };

            let scan = QuoteExtractor.scan(&doc, Some(page));
            if scan.containers == 0 {
                info!("No more quotes found.");
                break;
            }

            info!("Scraped {} quotes from page {}", scan.containers, page);
            self.records.extend(scan.records);

            if page < max_pages {
                page_delay(&self.sleeper, self.config.page_delay);
            }
        }

        info!("Total quotes scraped: {}", self.records.len());
        self.records.len() - before
    }

    /// Single fetch of the base URL.
    pub fn scrape_books(&mut self) -> usize {
        let Some(doc) = self.fetch_page(&self.base_url) else {
            return 0;
        };

        let scan = BookExtractor.scan(&doc, None);
        let added = scan.records.len();
        self.records.extend(scan.records);

        info!("Scraped {} books", added);
        added
    }

    /// Walks `{base}?page={n}` and hands each document to `handler`, keeping
    /// whatever records it returns. Stops on the first failed fetch. Returns
    /// the number of pages processed.
    pub fn scrape_with_pagination<H>(&mut self, max_pages: u32, mut handler: H) -> u32
    where
        H: FnMut(&Html, u32) -> Vec<Record>,
    {
        let mut processed = 0;

        for page in 1..=max_pages {
            let url = format!("{}?page={}", self.base_url, page);
            let Some(doc) = self.fetch_page(&url) else {
                break;
            };

            info!("Processing page {}...", page);
            self.records.extend(handler(&doc, page));
            processed += 1;

            if page < max_pages {
                page_delay(&self.sleeper, self.config.page_delay);
            }
        }

        processed
    }

    /// Writes the store in `format`. Failures are logged, not returned.
    pub fn save(&self, format: ExportFormat, path: &Path) -> Option<usize> {
        match exporter::export(self.records.as_slice(), format, path) {
            Ok(n) => {
                info!("Data saved to {}", path.display());
                Some(n)
            }
            Err(ExportError::NoRecords) => {
                error!("No data to save!");
                None
            }
            Err(e) => {
                error!("Error saving {}: {}", format.label(), e);
                None
            }
        }
    }

    pub fn save_to_csv(&self, path: &Path) -> Option<usize> {
        self.save(ExportFormat::Csv, path)
    }

    pub fn save_to_json(&self, path: &Path) -> Option<usize> {
        self.save(ExportFormat::Json, path)
    }

    pub fn save_to_txt(&self, path: &Path) -> Option<usize> {
        self.save(ExportFormat::Text, path)
    }

    /// `{stem}.csv`, `{stem}.json` and `{stem}.txt` under `dir`.
    pub fn save_all(&self, dir: &Path, stem: &str) {
        for format in ExportFormat::ALL {
            self.save(format, &dir.join(format.file_name(stem)));
        }
    }
}
