use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::IdentityProvider;
use crate::config::Config;
use crate::cover_letter::page_text::PageTextFetcher;
use crate::llm_client::LlmClient;
use crate::scrape::TrackerScraper;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    /// Verifies bearer tokens. Default: SupabaseAuth.
    pub auth: Arc<dyn IdentityProvider>,
    /// Fetches role/company pages for cover letter context.
    pub pages: PageTextFetcher,
    pub scraper: TrackerScraper,
    pub config: Config,
}
