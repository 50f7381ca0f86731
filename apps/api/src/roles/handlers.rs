use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::roles::availability::{filter_roles, RoleFilter, RoleView};
use crate::roles::repository::{get_role, last_updated, list_roles};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RoleListResponse {
    pub count: usize,
    pub roles: Vec<RoleView>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub total_roles: usize,
    pub open_roles: usize,
    pub categories: Vec<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub source_url: String,
    pub refresh_interval_secs: u64,
}

/// GET /api/roles
pub async fn handle_list_roles(
    State(state): State<AppState>,
    Query(filter): Query<RoleFilter>,
) -> Result<Json<RoleListResponse>, AppError> {
    let today = Local::now().date_naive();
    let roles = filter_roles(list_roles(&state.db).await?, &filter, today);
    Ok(Json(RoleListResponse {
        count: roles.len(),
        roles,
    }))
}

/// GET /api/roles/:id
pub async fn handle_get_role(
    State(state): State<AppState>,
    Path(role_id): Path<Uuid>,
) -> Result<Json<RoleView>, AppError> {
    let role = get_role(&state.db, role_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Role {role_id} not found")))?;
    Ok(Json(RoleView::new(role, Local::now().date_naive())))
}

/// GET /api/status
///
/// Aggregate counts over the catalogue.
pub async fn handle_status(State(state): State<AppState>) -> Result<Json<StatusResponse>, AppError> {
    let today = Local::now().date_naive();
    let roles = filter_roles(list_roles(&state.db).await?, &RoleFilter::default(), today);

    let open_roles = roles.iter().filter(|v| v.is_open).count();
    let categories: BTreeSet<String> = roles.iter().map(|v| v.role.category.clone()).collect();

    Ok(Json(StatusResponse {
        total_roles: roles.len(),
        open_roles,
        categories: categories.into_iter().collect(),
        last_updated: last_updated(&state.db).await?,
        source_url: state.config.tracker_url.clone(),
        refresh_interval_secs: state.config.scrape_interval.as_secs(),
    }))
}
