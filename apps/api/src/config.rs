use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_TRACKER_URL: &str = "https://app.the-trackr.com/uk-finance/graduate-programmes";

/// Application configuration loaded from environment variables.
/// Startup aborts if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub supabase_url: String,
    pub supabase_key: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub tracker_url: String,
    /// When set, the tracker page is rendered through this WebDriver server.
    pub webdriver_url: Option<String>,
    pub scrape_interval: Duration,
    pub scrape_render_wait: Duration,
    pub scrape_on_startup: bool,
    pub run_migrations: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            supabase_url: require_env("SUPABASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            supabase_key: require_env("SUPABASE_KEY")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_model: env_or("OPENAI_MODEL", "gpt-4o-mini"),
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
            tracker_url: env_or("TRACKER_URL", DEFAULT_TRACKER_URL),
            webdriver_url: std::env::var("WEBDRIVER_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            scrape_interval: interval_secs("SCRAPE_INTERVAL_SECS", 3600)?,
            scrape_render_wait: Duration::from_secs(
                parse_env("SCRAPE_RENDER_WAIT_SECS", 5)
                    .context("SCRAPE_RENDER_WAIT_SECS must be a whole number of seconds")?,
            ),
            scrape_on_startup: parse_env("SCRAPE_ON_STARTUP", true)
                .context("SCRAPE_ON_STARTUP must be true or false")?,
            run_migrations: parse_env("RUN_MIGRATIONS", true)
                .context("RUN_MIGRATIONS must be true or false")?,
            port: parse_env("PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => Ok(raw.trim().parse::<T>()?),
        Err(_) => Ok(default),
    }
}

/// A non-zero period in whole seconds; the scheduler cannot tick at zero.
fn interval_secs(key: &str, default: u64) -> Result<Duration> {
    let secs = parse_env(key, default)
        .ok()
        .filter(|secs| *secs > 0)
        .with_context(|| format!("{key} must be a positive whole number of seconds"))?;
    Ok(Duration::from_secs(secs))
}
