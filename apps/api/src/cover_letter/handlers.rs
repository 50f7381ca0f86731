use axum::{extract::State, Json};

use crate::auth::AuthUser;
use crate::cover_letter::generator::{generate_cover_letter, CoverLetterRequest, CoverLetterResponse};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/generate-cover-letter
///
/// Generates a cover letter for the caller and the given role, then saves it
/// on the caller's application for that role.
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    let response =
        generate_cover_letter(&state.db, &state.llm, &state.pages, &auth.user, &request).await?;
    Ok(Json(response))
}
