use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A graduate programme listing as stored in `graduate_roles`.
/// Written only by scrape runs; read-only for users.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GraduateRoleRow {
    pub id: Uuid,
    pub category: String,
    pub company_name: String,
    pub company_link: String,
    pub role_title: String,
    pub role_link: String,
    pub application_opens: Option<NaiveDate>,
    pub application_closes: Option<NaiveDate>,
    pub last_year_opened: Option<NaiveDate>,
    pub interview_stages: String,
    pub assessment_platform: String,
    pub online_application: String,
    pub cv_required: String,
    pub cover_letter: String,
    pub test_required: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
