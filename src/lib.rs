pub mod config;
pub mod delay_manager;
pub mod document;
pub mod exporter;
pub mod extractor;
pub mod fetcher;
pub mod logger;
pub mod record;
pub mod retry;
pub mod scraper;

// Exporting types for convenience
pub use config::ScraperConfig;
pub use exporter::{ExportError, ExportFormat};
pub use extractor::{BookExtractor, ExtractError, Extractor, PageScan, QuoteExtractor};
pub use fetcher::{Fetch, FetchError, HttpFetcher};
pub use record::{Record, RecordStore};
pub use crate::scraper::{ScraperError, Session};
