use axum::{extract::State, Json};
use tracing::info;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::scrape::ScrapeReport;
use crate::state::AppState;

/// POST /api/scrape-now
///
/// Runs the same scrape as the hourly job and waits for it to finish.
pub async fn handle_scrape_now(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ScrapeReport>, AppError> {
    info!("Manual scrape requested by user {}", auth.id());
    let report = state.scraper.run(&state.db).await?;
    Ok(Json(report))
}
