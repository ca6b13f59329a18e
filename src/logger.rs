use std::io::Write;
use chrono::Local;
use env_logger::{Builder, Env};
use log::{Level, SetLoggerError};

use crate::record::TIMESTAMP_FORMAT;

/// Filter used when `RUST_LOG` is unset: our own crate at info, dependencies
/// (reqwest, html5ever) only when they warn.
pub const DEFAULT_FILTER: &str = "warn,web_scraper=info,web_scraper_lib=info";

/// Installs the global logger. Lines look like
/// `2024-05-01 12:00:00 [INFO ] scraper - Fetching: http://...`.
pub fn init() {
    if let Err(e) = try_init() {
        eprintln!("Logger already initialized: {}", e);
    }
}

pub fn try_init() -> Result<(), SetLoggerError> {
    Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
        .format(|buf, record| {
            writeln!(
                buf,
                "{}",
                format_line(record.level(), record.target(), &record.args().to_string())
            )
        })
        .try_init()
}

fn format_line(level: Level, target: &str, message: &str) -> String {
    // Drop the crate prefix: `web_scraper_lib::scraper` -> `scraper`.
    let module = target.rsplit("::").next().unwrap_or(target);
    format!(
        "{} [{:<5}] {} - {}",
        Local::now().format(TIMESTAMP_FORMAT),
        level,
        module,
        message
    )
}
