// Tracker scraping: fetch the public listing page, parse table rows into roles,
// and upsert them keyed on (category, company, role). Runs hourly in the
// background and on demand via POST /api/scrape-now.

pub mod handlers;
pub mod job;
pub mod parser;
pub mod source;
pub mod store;

use thiserror::Error;

pub use job::{spawn_scheduler, ScrapeReport, TrackerScraper};

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("Invalid tracker URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
