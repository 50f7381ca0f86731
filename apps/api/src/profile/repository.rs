use serde::Deserialize;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::profile::UserProfileRow;

/// Editable profile fields as submitted by the profile form.
/// Identity (`id`, `email`) is never taken from the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub university: Option<String>,
    pub degree: Option<String>,
    pub graduation_year: Option<i32>,
    pub gpa: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub experience: Option<String>,
    pub achievements: Option<String>,
    pub interests: Option<String>,
}

impl ProfileUpdate {
    /// Trims text fields, turning blanks into `None` and dropping empty skills.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            full_name: clean(self.full_name),
            university: clean(self.university),
            degree: clean(self.degree),
            graduation_year: self.graduation_year,
            gpa: clean(self.gpa),
            skills: self
                .skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            experience: clean(self.experience),
            achievements: clean(self.achievements),
            interests: clean(self.interests),
        }
    }
}

pub async fn get_profile(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Option<UserProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, UserProfileRow>("SELECT * FROM user_profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(conn)
        .await
}

/// Inserts a bare profile row for a first-time user. No-op if one exists.
pub async fn ensure_profile(
    conn: &mut PgConnection,
    user_id: Uuid,
    email: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO user_profiles (id, email)
        VALUES ($1, $2)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(email)
    .execute(conn)
    .await?;
    Ok(())
}

/// Inserts or replaces the caller's profile and returns the stored row.
pub async fn upsert_profile(
    conn: &mut PgConnection,
    user_id: Uuid,
    email: Option<&str>,
    update: &ProfileUpdate,
) -> Result<UserProfileRow, sqlx::Error> {
    sqlx::query_as::<_, UserProfileRow>(
        r#"
        INSERT INTO user_profiles
            (id, email, full_name, university, degree, graduation_year, gpa,
             skills, experience, achievements, interests)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (id) DO UPDATE SET
            email = EXCLUDED.email,
            full_name = EXCLUDED.full_name,
            university = EXCLUDED.university,
            degree = EXCLUDED.degree,
            graduation_year = EXCLUDED.graduation_year,
            gpa = EXCLUDED.gpa,
            skills = EXCLUDED.skills,
            experience = EXCLUDED.experience,
            achievements = EXCLUDED.achievements,
            interests = EXCLUDED.interests,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(email)
    .bind(&update.full_name)
    .bind(&update.university)
    .bind(&update.degree)
    .bind(update.graduation_year)
    .bind(&update.gpa)
    .bind(&update.skills)
    .bind(&update.experience)
    .bind(&update.achievements)
    .bind(&update.interests)
    .fetch_one(conn)
    .await
}
