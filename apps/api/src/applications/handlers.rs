use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::applications::repository::{
    delete_application, list_applications, upsert_application, ApplicationUpdate,
};
use crate::auth::AuthUser;
use crate::db::begin_user_scope;
use crate::errors::AppError;
use crate::models::application::UserApplicationRow;
use crate::profile::repository::ensure_profile;
use crate::roles::repository::get_role;
use crate::state::AppState;

/// GET /api/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<UserApplicationRow>>, AppError> {
    let mut tx = begin_user_scope(&state.db, auth.id()).await?;
    let applications = list_applications(&mut *tx, auth.id()).await?;
    tx.commit().await?;
    Ok(Json(applications))
}

/// PUT /api/applications/:role_id
pub async fn handle_upsert_application(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(role_id): Path<Uuid>,
    Json(update): Json<ApplicationUpdate>,
) -> Result<Json<UserApplicationRow>, AppError> {
    get_role(&state.db, role_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Role {role_id} not found")))?;

    let mut tx = begin_user_scope(&state.db, auth.id()).await?;
    ensure_profile(&mut *tx, auth.id(), auth.user.email.as_deref()).await?;
    let application = upsert_application(&mut *tx, auth.id(), role_id, &update).await?;
    tx.commit().await?;

    info!(
        "User {} set application for role {role_id} to '{}'",
        auth.id(),
        application.status
    );
    Ok(Json(application))
}

/// DELETE /api/applications/:role_id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(role_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut tx = begin_user_scope(&state.db, auth.id()).await?;
    let deleted = delete_application(&mut *tx, auth.id(), role_id).await?;
    tx.commit().await?;

    if !deleted {
        return Err(AppError::NotFound(format!(
            "No application for role {role_id}"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}
