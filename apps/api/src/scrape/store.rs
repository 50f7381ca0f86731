use sqlx::{PgConnection, PgPool};
use tracing::info;

use super::parser::ScrapedRole;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertCounts {
    pub inserted: usize,
    pub updated: usize,
}

/// Inserts or refreshes one role, keyed on (category, company_name, role_title).
/// Returns `true` when a new row was created.
async fn upsert_role(conn: &mut PgConnection, role: &ScrapedRole) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        r#"
        INSERT INTO graduate_roles
            (category, company_name, company_link, role_title, role_link,
             application_opens, application_closes, last_year_opened,
             interview_stages, assessment_platform, online_application,
             cv_required, cover_letter, test_required, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        ON CONFLICT (category, company_name, role_title) DO UPDATE SET
            company_link = EXCLUDED.company_link,
            role_link = EXCLUDED.role_link,
            application_opens = EXCLUDED.application_opens,
            application_closes = EXCLUDED.application_closes,
            last_year_opened = EXCLUDED.last_year_opened,
            interview_stages = EXCLUDED.interview_stages,
            assessment_platform = EXCLUDED.assessment_platform,
            online_application = EXCLUDED.online_application,
            cv_required = EXCLUDED.cv_required,
            cover_letter = EXCLUDED.cover_letter,
            test_required = EXCLUDED.test_required,
            notes = EXCLUDED.notes,
            updated_at = now()
        RETURNING (xmax = 0) AS inserted
        "#,
    )
    .bind(&role.category)
    .bind(&role.company_name)
    .bind(&role.company_link)
    .bind(&role.role_title)
    .bind(&role.role_link)
    .bind(role.application_opens)
    .bind(role.application_closes)
    .bind(role.last_year_opened)
    .bind(&role.interview_stages)
    .bind(&role.assessment_platform)
    .bind(&role.online_application)
    .bind(&role.cv_required)
    .bind(&role.cover_letter)
    .bind(&role.test_required)
    .bind(&role.notes)
    .fetch_one(conn)
    .await
}

/// Upserts a whole scrape in one transaction: either every row lands or none do.
/// Role ids survive re-scrapes, so user applications keep pointing at them.
pub async fn upsert_roles(pool: &PgPool, roles: &[ScrapedRole]) -> Result<UpsertCounts, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut counts = UpsertCounts::default();

    for role in roles {
        if upsert_role(&mut *tx, role).await? {
            counts.inserted += 1;
        } else {
            counts.updated += 1;
        }
    }

    tx.commit().await?;
    info!(
        "Upserted {} roles ({} new, {} refreshed)",
        roles.len(),
        counts.inserted,
        counts.updated
    );
    Ok(counts)
}
