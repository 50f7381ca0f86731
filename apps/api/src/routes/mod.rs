pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::applications::handlers as applications;
use crate::auth::handlers as auth;
use crate::cover_letter::handlers as cover_letter;
use crate::profile::handlers as profile;
use crate::roles::handlers as roles;
use crate::scrape::handlers as scrape;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/auth/login", post(auth::handle_login))
        .route("/api/auth/logout", post(auth::handle_logout))
        .route("/api/auth/signup", post(auth::handle_signup))
        // Profile
        .route(
            "/api/profile",
            get(profile::handle_get_profile).put(profile::handle_update_profile),
        )
        // Roles (public)
        .route("/api/roles", get(roles::handle_list_roles))
        .route("/api/roles/:id", get(roles::handle_get_role))
        .route("/api/status", get(roles::handle_status))
        // Scraping
        .route("/api/scrape-now", post(scrape::handle_scrape_now))
        // Applications
        .route("/api/applications", get(applications::handle_list_applications))
        .route(
            "/api/applications/:role_id",
            put(applications::handle_upsert_application)
                .delete(applications::handle_delete_application),
        )
        // Cover letters
        .route(
            "/api/generate-cover-letter",
            post(cover_letter::handle_generate_cover_letter),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::auth::{AuthError, AuthenticatedUser, IdentityProvider, Session};
    use crate::config::{Config, DEFAULT_TRACKER_URL};
    use crate::cover_letter::page_text::PageTextFetcher;
    use crate::llm_client::LlmClient;
    use crate::scrape::source::HttpPageSource;
    use crate::scrape::TrackerScraper;

    /// Accepts exactly one token; never reaches the network.
    struct StubIdentity;

    const GOOD_TOKEN: &str = "good-token";

    #[async_trait]
    impl IdentityProvider for StubIdentity {
        async fn verify(&self, access_token: &str) -> Result<AuthenticatedUser, AuthError> {
            if access_token == GOOD_TOKEN {
                Ok(AuthenticatedUser {
                    id: Uuid::nil(),
                    email: Some("ada@example.com".to_string()),
                })
            } else {
                Err(AuthError::InvalidToken)
            }
        }

        async fn sign_in(&self, _email: &str, _password: &str) -> Result<Session, AuthError> {
            Err(AuthError::InvalidCredentials)
        }

        async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
            Ok(())
        }
    }

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/gradtracker_test".to_string(),
            supabase_url: "http://127.0.0.1:1".to_string(),
            supabase_key: "anon".to_string(),
            openai_api_key: "sk-test".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_base_url: "http://127.0.0.1:1".to_string(),
            tracker_url: DEFAULT_TRACKER_URL.to_string(),
            webdriver_url: None,
            scrape_interval: Duration::from_secs(3600),
            scrape_render_wait: Duration::from_secs(5),
            scrape_on_startup: false,
            run_migrations: false,
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    /// Router over a pool that never connects; only handlers that fail before
    /// touching the database can be exercised.
    fn test_app() -> Router {
        let config = test_config();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let state = AppState {
            db,
            llm: LlmClient::new(
                config.openai_api_key.clone(),
                config.openai_base_url.clone(),
                config.openai_model.clone(),
            )
            .unwrap(),
            auth: Arc::new(StubIdentity),
            pages: PageTextFetcher::new().unwrap(),
            scraper: TrackerScraper::new(
                Arc::new(HttpPageSource::new().unwrap()),
                config.tracker_url.clone(),
            ),
            config,
        };
        build_router(state)
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_profile_requires_token() {
        let (status, body) =
            send(Request::get("/api/profile").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_rejected_token_is_unauthorized() {
        let request = Request::get("/api/applications")
            .header(header::AUTHORIZATION, "Bearer someone-elses-token")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_cover_letter_requires_token() {
        let request = Request::post("/api/generate-cover-letter")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(format!(r#"{{"role_id": "{}"}}"#, Uuid::new_v4())))
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_scrape_now_requires_token() {
        let request = Request::post("/api/scrape-now").body(Body::empty()).unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_signup_is_closed() {
        let request = Request::post("/api/auth/signup").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_login_rejects_blank_credentials() {
        let request = Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email": " ", "password": ""}"#))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let request = Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email": "ada@example.com", "password": "nope"}"#))
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_with_valid_token() {
        let request = Request::post("/api/auth/logout")
            .header(header::AUTHORIZATION, format!("Bearer {GOOD_TOKEN}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_role_id_must_be_uuid() {
        let (status, _) =
            send(Request::get("/api/roles/not-a-uuid").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
