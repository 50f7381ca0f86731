mod applications;
mod auth;
mod config;
mod cover_letter;
mod db;
mod errors;
mod llm_client;
mod models;
mod profile;
mod roles;
mod routes;
mod scrape;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::SupabaseAuth;
use crate::config::Config;
use crate::cover_letter::page_text::PageTextFetcher;
use crate::db::{create_pool, run_migrations};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::scrape::source::build_page_source;
use crate::scrape::{spawn_scheduler, TrackerScraper};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Graduate Tracker API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    if config.run_migrations {
        run_migrations(&db).await?;
    }

    // Initialize LLM client
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    let auth = Arc::new(SupabaseAuth::new(
        &config.supabase_url,
        config.supabase_key.clone(),
    )?);
    info!("Identity provider: {}", config.supabase_url);

    let pages = PageTextFetcher::new()?;

    // Tracker scraper: WebDriver when configured, plain HTTP otherwise
    let scraper = TrackerScraper::new(build_page_source(&config)?, config.tracker_url.clone());
    spawn_scheduler(
        scraper.clone(),
        db.clone(),
        config.scrape_interval,
        config.scrape_on_startup,
    );
    info!(
        "Scrape scheduler started (every {}s)",
        config.scrape_interval.as_secs()
    );

    // Build app state
    let state = AppState {
        db,
        llm,
        auth,
        pages,
        scraper,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
