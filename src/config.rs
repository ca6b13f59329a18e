use std::env;
use std::str::FromStr;
use std::time::Duration;
use log::warn;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Knobs shared by the fetcher, the extractors and the menu.
#[derive(Debug, Clone, PartialEq)]
pub struct ScraperConfig {
    pub timeout: Duration,
    pub user_agent: String,
    /// Politeness pause between consecutive page fetches.
    pub page_delay: Duration,
    pub max_pages: u32,
    pub max_retries: u32,
    pub preview_limit: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        ScraperConfig {
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_delay: Duration::from_secs(1),
            max_pages: 3,
            max_retries: 3,
            preview_limit: 3,
        }
    }
}

impl ScraperConfig {
    /// Defaults, overridden by any `SCRAPER_*` variables that parse.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<L>(lookup: L) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut config = ScraperConfig::default();

        if let Some(secs) = parse_var::<u64, _>(&lookup, "SCRAPER_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(ua) = lookup("SCRAPER_USER_AGENT").filter(|s| !s.trim().is_empty()) {
            config.user_agent = ua;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "SCRAPER_PAGE_DELAY_MS") {
            config.page_delay = Duration::from_millis(ms);
        }
        if let Some(pages) = parse_var(&lookup, "SCRAPER_MAX_PAGES") {
            config.max_pages = pages;
        }
        if let Some(retries) = parse_var(&lookup, "SCRAPER_MAX_RETRIES") {
            config.max_retries = retries;
        }
        if let Some(limit) = parse_var(&lookup, "SCRAPER_PREVIEW_LIMIT") {
            config.preview_limit = limit;
        }

        config
    }
}

fn parse_var<T, L>(lookup: &L, key: &str) -> Option<T>
where
    T: FromStr,
    L: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid number", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_demo_settings() {
        let config = ScraperConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.page_delay, Duration::from_secs(1));
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn env_overrides_apply_and_bad_values_are_ignored() {
        let config = ScraperConfig::from_lookup(lookup_from(&[
            ("SCRAPER_TIMEOUT_SECS", "4"),
            ("SCRAPER_PAGE_DELAY_MS", "250"),
            ("SCRAPER_MAX_PAGES", "ten"),
            ("SCRAPER_USER_AGENT", "test-agent/1.0"),
        ]));
        assert_eq!(config.timeout, Duration::from_secs(4));
        assert_eq!(config.page_delay, Duration::from_millis(250));
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.user_agent, "test-agent/1.0");
    }
}
