use std::fmt;
use chrono::{DateTime, Local};
use serde::ser::{Serialize, SerializeMap, Serializer};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const PAGE_KEY: &str = "page";
pub const SCRAPED_AT_KEY: &str = "scraped_at";

/// One extracted item. Key order is: extractor fields as inserted, then
/// `page` when set, then `scraped_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, String)>,
    page: Option<u32>,
    scraped_at: DateTime<Local>,
}

impl Record {
    pub fn new() -> Self {
        Record {
            fields: Vec::new(),
            page: None,
            scraped_at: Local::now(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page(&self) -> Option<u32> {
        self.page
    }

    pub fn scraped_at(&self) -> String {
        self.scraped_at.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.fields.iter().map(|(k, _)| k.as_str()).collect();
        if self.page.is_some() {
            keys.push(PAGE_KEY);
        }
        keys.push(SCRAPED_AT_KEY);
        keys
    }

    pub fn entries(&self) -> Vec<(&str, String)> {
        let mut entries: Vec<(&str, String)> = self
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        if let Some(page) = self.page {
            entries.push((PAGE_KEY, page.to_string()));
        }
        entries.push((SCRAPED_AT_KEY, self.scraped_at()));
        entries
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            PAGE_KEY if self.page.is_some() => self.page.map(|p| p.to_string()),
            SCRAPED_AT_KEY => Some(self.scraped_at()),
            _ => self
                .fields
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone()),
        }
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.fields.len() + 1 + usize::from(self.page.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        if let Some(page) = self.page {
            map.serialize_entry(PAGE_KEY, &page)?;
        }
        map.serialize_entry(SCRAPED_AT_KEY, &self.scraped_at())?;
        map.end()
    }
}

/// Block layout shared by the text export and the console preview.
pub struct Block<'a> {
    pub index: usize,
    pub record: &'a Record,
}

impl fmt::Display for Block<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Record {} ---", self.index)?;
        for (key, value) in self.record.entries() {
            writeln!(f, "{}: {}", key, value)?;
        }
        Ok(())
    }
}

/// Records in extraction order. Never reordered, never deduplicated.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Numbered blocks for at most the first `limit` records.
    pub fn preview(&self, limit: usize) -> impl Iterator<Item = Block<'_>> {
        self.records
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, record)| Block { index: i + 1, record })
    }
}

impl Extend<Record> for RecordStore {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}
