use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::auth::AuthUser;
use crate::db::begin_user_scope;
use crate::errors::AppError;
use crate::models::profile::UserProfileRow;
use crate::profile::completeness::{check_profile, ProfileCompleteness};
use crate::profile::repository::{get_profile, upsert_profile, ProfileUpdate};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: UserProfileRow,
    pub completeness: ProfileCompleteness,
}

impl From<UserProfileRow> for ProfileResponse {
    fn from(profile: UserProfileRow) -> Self {
        let completeness = check_profile(&profile);
        ProfileResponse {
            profile,
            completeness,
        }
    }
}

/// GET /api/profile
///
/// Returns the caller's profile, or an empty one carrying their id and email
/// if they have never saved it.
pub async fn handle_get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let mut tx = begin_user_scope(&state.db, auth.id()).await?;
    let profile = get_profile(&mut *tx, auth.id()).await?;
    tx.commit().await?;

    let profile =
        profile.unwrap_or_else(|| UserProfileRow::empty(auth.id(), auth.user.email.clone()));
    Ok(Json(profile.into()))
}

/// PUT /api/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ProfileResponse>, AppError> {
    let update = update.normalized();
    if let Some(year) = update.graduation_year {
        if !(1950..=2100).contains(&year) {
            return Err(AppError::Validation(format!(
                "graduation_year {year} is out of range"
            )));
        }
    }

    let mut tx = begin_user_scope(&state.db, auth.id()).await?;
    let profile = upsert_profile(&mut *tx, auth.id(), auth.user.email.as_deref(), &update).await?;
    tx.commit().await?;

    info!("Updated profile for user {}", auth.id());
    Ok(Json(profile.into()))
}
