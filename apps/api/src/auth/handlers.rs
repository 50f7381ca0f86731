use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{AuthUser, AuthenticatedUser};
use crate::db::begin_user_scope;
use crate::errors::AppError;
use crate::profile::repository::ensure_profile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: AuthenticatedUser,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// POST /api/auth/login
///
/// Exchanges email + password for an access token at the identity provider
/// and provisions the caller's profile row on first login.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "email and password are required".to_string(),
        ));
    }

    let session = state.auth.sign_in(req.email.trim(), &req.password).await?;

    let mut tx = begin_user_scope(&state.db, session.user.id).await?;
    ensure_profile(&mut *tx, session.user.id, session.user.email.as_deref()).await?;
    tx.commit().await?;

    info!("User {} signed in", session.user.id);
    Ok(Json(LoginResponse {
        user: session.user,
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        expires_in: session.expires_in,
    }))
}

/// POST /api/auth/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, AppError> {
    state.auth.sign_out(&auth.access_token).await?;
    info!("User {} signed out", auth.id());
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/auth/signup
///
/// Self-service signup is closed; accounts are created by an administrator
/// in the identity provider's dashboard.
pub async fn handle_signup() -> Result<StatusCode, AppError> {
    warn!("Rejected self-service signup attempt");
    Err(AppError::Forbidden)
}
