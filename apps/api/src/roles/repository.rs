use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::role::GraduateRoleRow;

/// All roles, most recently opened first; roles with no open date last.
pub async fn list_roles(pool: &PgPool) -> Result<Vec<GraduateRoleRow>, sqlx::Error> {
    sqlx::query_as::<_, GraduateRoleRow>(
        r#"
        SELECT * FROM graduate_roles
        ORDER BY application_opens DESC NULLS LAST, company_name, role_title
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_role(pool: &PgPool, role_id: Uuid) -> Result<Option<GraduateRoleRow>, sqlx::Error> {
    sqlx::query_as::<_, GraduateRoleRow>("SELECT * FROM graduate_roles WHERE id = $1")
        .bind(role_id)
        .fetch_optional(pool)
        .await
}

pub async fn count_roles(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM graduate_roles")
        .fetch_one(pool)
        .await
}

/// Time of the most recent scrape write, if any roles exist.
pub async fn last_updated(pool: &PgPool) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    sqlx::query_scalar("SELECT MAX(updated_at) FROM graduate_roles")
        .fetch_one(pool)
        .await
}
