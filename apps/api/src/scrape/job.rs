//! Scrape job: fetch → parse → dedupe → upsert, plus the hourly scheduler.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use super::parser::{dedupe_by_key, parse_tracker_page, ScrapedRole};
use super::source::PageSource;
use super::store::upsert_roles;
use super::ScrapeError;
use crate::roles::repository::count_roles;

/// Outcome of one scrape run.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub source: &'static str,
    pub rows_found: usize,
    pub inserted: usize,
    pub updated: usize,
    pub categories: usize,
    pub companies: usize,
    pub duration_ms: u128,
    pub finished_at: DateTime<Utc>,
}

/// Scrapes one tracker page. Shared by the scheduler and the manual trigger.
#[derive(Clone)]
pub struct TrackerScraper {
    source: Arc<dyn PageSource>,
    tracker_url: String,
}

impl TrackerScraper {
    pub fn new(source: Arc<dyn PageSource>, tracker_url: String) -> Self {
        Self {
            source,
            tracker_url,
        }
    }

    /// Fetches and parses the tracker, returning one row per listing key.
    pub async fn collect(&self) -> Result<Vec<ScrapedRole>, ScrapeError> {
        info!(
            "Fetching tracker page {} via {}",
            self.tracker_url,
            self.source.name()
        );
        let html = self.source.fetch_html(&self.tracker_url).await?;
        let rows = parse_tracker_page(&html, &self.tracker_url)?;
        Ok(dedupe_by_key(rows))
    }

    /// Runs a full scrape and writes the results.
    /// An empty page writes nothing, so a layout change never wipes data.
    pub async fn run(&self, pool: &PgPool) -> Result<ScrapeReport, ScrapeError> {
        let started = Instant::now();
        let roles = self.collect().await?;

        let counts = if roles.is_empty() {
            warn!("No roles extracted from tracker page; the page structure may have changed");
            Default::default()
        } else {
            upsert_roles(pool, &roles).await?
        };

        let categories: HashSet<&str> = roles.iter().map(|r| r.category.as_str()).collect();
        let companies: HashSet<&str> = roles.iter().map(|r| r.company_name.as_str()).collect();

        let report = ScrapeReport {
            source: self.source.name(),
            rows_found: roles.len(),
            inserted: counts.inserted,
            updated: counts.updated,
            categories: categories.len(),
            companies: companies.len(),
            duration_ms: started.elapsed().as_millis(),
            finished_at: Utc::now(),
        };
        info!(
            "Scrape finished: {} rows across {} categories and {} companies in {}ms",
            report.rows_found, report.categories, report.companies, report.duration_ms
        );
        Ok(report)
    }
}

async fn run_logged(scraper: &TrackerScraper, pool: &PgPool) {
    if let Err(e) = scraper.run(pool).await {
        error!("Scheduled scrape failed, will retry next cycle: {e}");
    }
}

/// Spawns the background scrape loop.
///
/// With `scrape_on_startup`, an empty roles table is filled immediately;
/// after that the scrape repeats every `every`.
pub fn spawn_scheduler(
    scraper: TrackerScraper,
    pool: PgPool,
    every: Duration,
    scrape_on_startup: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if scrape_on_startup {
            match count_roles(&pool).await {
                Ok(0) => {
                    info!("No roles in database. Running initial scrape...");
                    run_logged(&scraper, &pool).await;
                }
                Ok(n) => info!("{n} roles already stored; skipping initial scrape"),
                Err(e) => {
                    warn!("Could not count roles ({e}); running initial scrape");
                    run_logged(&scraper, &pool).await;
                }
            }
        }

        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            run_logged(&scraper, &pool).await;
        }
    })
}
