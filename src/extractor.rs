use std::sync::LazyLock;
use log::warn;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::document::{clean_text_of, first, text_of};
use crate::record::Record;

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector")
}

static QUOTE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("div.quote"));
static QUOTE_TEXT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("span.text"));
static QUOTE_AUTHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("small.author"));
static QUOTE_TAG_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("a.tag"));

static BOOK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("article.product_pod"));
static BOOK_LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("h3 a"));
static BOOK_PRICE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("p.price_color"));
static BOOK_RATING_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("p.star-rating"));
static BOOK_STOCK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| selector("p.instock.availability"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("missing {0}")]
    MissingField(&'static str),
}

/// What one document yielded: how many containers matched, and the records
/// that could be built from them.
#[derive(Debug, Default)]
pub struct PageScan {
    pub containers: usize,
    pub records: Vec<Record>,
}

impl PageScan {
    pub fn skipped(&self) -> usize {
        self.containers - self.records.len()
    }
}

/// Site-specific walk of a parsed document.
pub trait Extractor {
    /// Singular noun used in log lines, e.g. "quote".
    fn kind(&self) -> &'static str;

    fn containers(&self) -> &Selector;

    fn extract_one(&self, container: ElementRef<'_>) -> Result<Record, ExtractError>;

    /// Extracts every container; a container with a missing field is logged
    /// and skipped without affecting its siblings.
    fn scan(&self, document: &Html, page: Option<u32>) -> PageScan {
        let mut scan = PageScan::default();
        for container in document.select(self.containers()) {
            scan.containers += 1;
            match self.extract_one(container) {
                Ok(record) => scan.records.push(match page {
                    Some(p) => record.on_page(p),
                    None => record,
                }),
                Err(e) => warn!("Could not extract all data from a {}: {}", self.kind(), e),
            }
        }
        scan
    }
}

pub struct QuoteExtractor;

impl Extractor for QuoteExtractor {
    fn kind(&self) -> &'static str {
        "quote"
    }

    fn containers(&self) -> &Selector {
        &QUOTE_SELECTOR
    }

    fn extract_one(&self, container: ElementRef<'_>) -> Result<Record, ExtractError> {
        let text = first(container, &QUOTE_TEXT_SELECTOR)
            .map(text_of)
            .ok_or(ExtractError::MissingField("quote text"))?;
        let author = first(container, &QUOTE_AUTHOR_SELECTOR)
            .map(text_of)
            .ok_or(ExtractError::MissingField("author"))?;
        let tags: Vec<String> = container.select(&QUOTE_TAG_SELECTOR).map(text_of).collect();

        Ok(Record::new()
            .with_field("quote", text)
            .with_field("author", author)
            .with_field("tags", tags.join(", ")))
    }
}

pub struct BookExtractor;

impl Extractor for BookExtractor {
    fn kind(&self) -> &'static str {
        "book"
    }

    fn containers(&self) -> &Selector {
        &BOOK_SELECTOR
    }

    fn extract_one(&self, container: ElementRef<'_>) -> Result<Record, ExtractError> {
        let title = first(container, &BOOK_LINK_SELECTOR)
            .and_then(|a| a.value().attr("title"))
            .ok_or(ExtractError::MissingField("title"))?;
        let price = first(container, &BOOK_PRICE_SELECTOR)
            .map(text_of)
            .ok_or(ExtractError::MissingField("price"))?;
        // Rating is the second class token: class="star-rating Three".
        let rating = first(container, &BOOK_RATING_SELECTOR)
            .and_then(|p| p.value().attr("class"))
            .and_then(|classes| classes.split_whitespace().nth(1))
            .ok_or(ExtractError::MissingField("rating"))?;
        let availability = first(container, &BOOK_STOCK_SELECTOR)
            .map(clean_text_of)
            .ok_or(ExtractError::MissingField("availability"))?;

        Ok(Record::new()
            .with_field("title", title)
            .with_field("price", price)
            .with_field("rating", rating)
            .with_field("availability", availability))
    }
}
