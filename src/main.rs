use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::Path;
use log::{error, info, warn};

use web_scraper_lib::{document, logger, ScraperConfig, Session};

const QUOTES_URL: &str = "http://quotes.toscrape.com";
const BOOKS_URL: &str = "http://books.toscrape.com";
const PREVIEW_CHARS: usize = 500;

fn main() -> Result<(), Box<dyn Error>> {
    logger::init();
    let config = ScraperConfig::from_env();

    println!("\nWEB SCRAPER DEMONSTRATION");
    println!("{}", "=".repeat(60));
    println!("\nChoose what to scrape:");
    println!("1. Quotes (from quotes.toscrape.com)");
    println!("2. Books (from books.toscrape.com)");
    println!("3. Custom URL");

    let choice = prompt("\nEnter your choice (1-3): ")?;

    match choice.trim() {
        "1" => {
            banner("SCRAPING QUOTES FROM QUOTES.TOSCRAPE.COM");
            let mut session = Session::new(QUOTES_URL, config.clone())?;
            session.scrape_quotes();
            display_data(&session, config.preview_limit);

            banner("SAVING DATA");
            session.save_all(Path::new("."), "quotes");
        }
        "2" => {
            banner("SCRAPING BOOKS FROM BOOKS.TOSCRAPE.COM");
            let mut session = Session::new(BOOKS_URL, config.clone())?;
            session.scrape_books();
            display_data(&session, config.preview_limit);

            banner("SAVING DATA");
            session.save_all(Path::new("."), "books");
        }
        "3" => inspect_custom_url(config)?,
        other => error!("Invalid choice: {:?}", other),
    }

    banner("SCRAPING COMPLETED");
    Ok(())
}

fn inspect_custom_url(config: ScraperConfig) -> Result<(), Box<dyn Error>> {
    let url = prompt("Enter the URL to scrape: ")?;
    let url = url.trim();

    let session = match Session::new(url, config) {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
            return Ok(());
        }
    };

    warn!("Custom sites need their own extractor; showing the page structure only.");

    if let Some(doc) = session.scrape_with_configured_retries(url) {
        if let Some(title) = document::title(&doc) {
            info!("Title: {}", title);
        }
        println!("\nPage structure:");
        println!("{}\n", document::preview(&doc, PREVIEW_CHARS));
    }
    Ok(())
}

fn display_data(session: &Session, limit: usize) {
    let records = session.records();
    if records.is_empty() {
        error!("No data to display!");
        return;
    }

    banner(&format!("DISPLAYING FIRST {} RECORDS", limit.min(records.len())));
    for block in records.preview(limit) {
        println!("{}", block);
    }
}

fn banner(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{}", title);
    println!("{}\n", "=".repeat(60));
}

fn prompt(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}
