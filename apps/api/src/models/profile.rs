use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per authenticated identity. `id` is the identity provider's user id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct UserProfileRow {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub university: Option<String>,
    pub degree: Option<String>,
    pub graduation_year: Option<i32>,
    pub gpa: Option<String>,
    pub skills: Vec<String>,
    pub experience: Option<String>,
    pub achievements: Option<String>,
    pub interests: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfileRow {
    /// Placeholder returned before the user has saved anything.
    pub fn empty(id: Uuid, email: Option<String>) -> Self {
        Self {
            id,
            email,
            ..Default::default()
        }
    }
}
