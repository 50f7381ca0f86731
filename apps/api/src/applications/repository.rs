use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::application::{ApplicationStatus, UserApplicationRow};

/// Body of `PUT /api/applications/:role_id`. Omitted fields keep their stored value.
/// Moving to `Applied` with no date on record stamps the current date.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationUpdate {
    pub status: Option<ApplicationStatus>,
    pub applied_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

pub async fn list_applications(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Vec<UserApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, UserApplicationRow>(
        "SELECT * FROM user_applications WHERE user_id = $1 ORDER BY updated_at DESC",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
}

pub async fn upsert_application(
    conn: &mut PgConnection,
    user_id: Uuid,
    role_id: Uuid,
    update: &ApplicationUpdate,
) -> Result<UserApplicationRow, sqlx::Error> {
    sqlx::query_as::<_, UserApplicationRow>(
        r#"
        INSERT INTO user_applications (user_id, role_id, status, applied_date, notes)
        VALUES (
            $1, $2, COALESCE($3, 'Not Applied'),
            COALESCE($4, CASE WHEN $3 = 'Applied' THEN CURRENT_DATE END),
            $5
        )
        ON CONFLICT (user_id, role_id) DO UPDATE SET
            status = COALESCE($3, user_applications.status),
            applied_date = COALESCE(
                $4,
                user_applications.applied_date,
                CASE WHEN $3 = 'Applied' THEN CURRENT_DATE END
            ),
            notes = COALESCE($5, user_applications.notes),
            updated_at = now()
        WHERE user_applications.user_id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(role_id)
    .bind(update.status.map(|s| s.as_str()))
    .bind(update.applied_date)
    .bind(&update.notes)
    .fetch_one(conn)
    .await
}

/// Stores a generated cover letter on the caller's application, creating it if needed.
pub async fn save_cover_letter(
    conn: &mut PgConnection,
    user_id: Uuid,
    role_id: Uuid,
    cover_letter: &str,
) -> Result<UserApplicationRow, sqlx::Error> {
    sqlx::query_as::<_, UserApplicationRow>(
        r#"
        INSERT INTO user_applications (user_id, role_id, cover_letter)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, role_id) DO UPDATE SET
            cover_letter = EXCLUDED.cover_letter,
            updated_at = now()
        WHERE user_applications.user_id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(role_id)
    .bind(cover_letter)
    .fetch_one(conn)
    .await
}

/// Returns `false` if the caller had no application for this role.
pub async fn delete_application(
    conn: &mut PgConnection,
    user_id: Uuid,
    role_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_applications WHERE user_id = $1 AND role_id = $2")
        .bind(user_id)
        .bind(role_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
