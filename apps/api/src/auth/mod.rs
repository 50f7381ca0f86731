//! Authentication: delegates credential checks to the managed identity provider.
//!
//! The service never stores passwords or mints tokens. Every protected handler
//! takes an [`AuthUser`], which resolves the bearer token through the
//! configured [`IdentityProvider`].

pub mod handlers;
pub mod supabase;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub use supabase::SupabaseAuth;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No authorization token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Identity provider returned status {status}: {message}")]
    Upstream { status: u16, message: String },
}

/// The identity behind a verified access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// A freshly issued session from a password sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub user: AuthenticatedUser,
}

/// External identity service. Production uses [`SupabaseAuth`].
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves an access token to its user, or `AuthError::InvalidToken`.
    async fn verify(&self, access_token: &str) -> Result<AuthenticatedUser, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

/// Extractor for handlers that require a signed-in caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: AuthenticatedUser,
    pub access_token: String,
}

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let user = state.auth.verify(token).await.map_err(|e| {
            tracing::debug!("Rejected bearer token: {e}");
            AppError::from(e)
        })?;
        Ok(AuthUser {
            user,
            access_token: token.to_string(),
        })
    }
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;
    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::MissingToken)?;
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}
