//! Cover letter generation pipeline.
//!
//! Flow: load role → load profile → completeness gate → fetch linked pages →
//!       fill prompt → completion call → persist onto the user's application.
//!
//! Nothing is written until the completion call has succeeded.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::applications::repository::save_cover_letter;
use crate::auth::AuthenticatedUser;
use crate::cover_letter::page_text::PageTextFetcher;
use crate::cover_letter::prompts::{
    COMPANY_CONTEXT_HEADING, COVER_LETTER_PARAMS, COVER_LETTER_PROMPT_TEMPLATE,
    COVER_LETTER_SYSTEM, ROLE_CONTEXT_HEADING,
};
use crate::db::begin_user_scope;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::profile::UserProfileRow;
use crate::models::role::GraduateRoleRow;
use crate::profile::completeness::check_profile;
use crate::profile::repository::get_profile;
use crate::roles::repository::get_role;

#[derive(Debug, Clone, Deserialize)]
pub struct CoverLetterRequest {
    pub role_id: Uuid,
    /// Extra guidance from the user, appended to the role's tracker notes.
    pub additional_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoverLetterResponse {
    pub role_id: Uuid,
    pub application_id: Uuid,
    pub cover_letter: String,
    pub model: String,
}

/// Everything the prompt is built from.
pub struct PromptInputs<'a> {
    pub role: &'a GraduateRoleRow,
    pub profile: &'a UserProfileRow,
    pub additional_notes: Option<&'a str>,
    pub company_page: Option<String>,
    pub role_page: Option<String>,
}

/// Renders the candidate block from whichever profile fields are filled in.
pub fn candidate_summary(profile: &UserProfileRow) -> String {
    let mut lines = Vec::new();
    let mut push = |label: &str, value: Option<&str>| {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            lines.push(format!("{label}: {v}"));
        }
    };

    push("Name", profile.full_name.as_deref());
    push("University", profile.university.as_deref());
    push("Degree", profile.degree.as_deref());
    let year = profile.graduation_year.map(|y| y.to_string());
    push("Graduation Year", year.as_deref());
    push("GPA", profile.gpa.as_deref());
    let skills = profile.skills.join(", ");
    push("Skills", Some(skills.as_str()));
    push("Experience", profile.experience.as_deref());
    push("Achievements", profile.achievements.as_deref());
    push("Interests", profile.interests.as_deref());

    if lines.is_empty() {
        "No profile information provided".to_string()
    } else {
        lines.join("\n")
    }
}

fn context_block(heading: &str, page: Option<&str>) -> String {
    match page {
        Some(text) => format!("\n{heading}\n{text}"),
        None => String::new(),
    }
}

/// Substitutes `{name}` placeholders in a single left-to-right pass, so text
/// inserted for one placeholder is never scanned for another. Unknown
/// placeholders are left as they are.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let filled = tail.find('}').and_then(|end| {
            let name = &tail[1..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (end, *value))
        });
        match filled {
            Some((end, value)) => {
                out.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Fills the fixed cover letter template.
pub fn build_prompt(inputs: &PromptInputs<'_>) -> String {
    let notes = [Some(inputs.role.notes.as_str()), inputs.additional_notes]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join("; ");
    let company_context = context_block(COMPANY_CONTEXT_HEADING, inputs.company_page.as_deref());
    let role_context = context_block(ROLE_CONTEXT_HEADING, inputs.role_page.as_deref());
    let candidate = candidate_summary(inputs.profile);

    fill_template(
        COVER_LETTER_PROMPT_TEMPLATE,
        &[
            ("company", inputs.role.company_name.as_str()),
            ("role", inputs.role.role_title.as_str()),
            ("notes", notes.as_str()),
            ("company_context", company_context.as_str()),
            ("role_context", role_context.as_str()),
            ("candidate", candidate.as_str()),
        ],
    )
}

/// Loads the caller's profile and rejects it unless it is complete.
async fn load_complete_profile(pool: &PgPool, user_id: Uuid) -> Result<UserProfileRow, AppError> {
    let mut tx = begin_user_scope(pool, user_id).await?;
    let profile = get_profile(&mut *tx, user_id).await?;
    tx.commit().await?;

    let profile = profile.ok_or_else(|| {
        AppError::UnprocessableEntity(
            "Profile not found. Fill in your profile before generating a cover letter."
                .to_string(),
        )
    })?;

    let completeness = check_profile(&profile);
    if !completeness.complete {
        return Err(AppError::UnprocessableEntity(format!(
            "Profile incomplete. Missing: {}",
            completeness.missing.join(", ")
        )));
    }
    Ok(profile)
}

/// Runs the full pipeline for one role and one user.
pub async fn generate_cover_letter(
    pool: &PgPool,
    llm: &LlmClient,
    pages: &PageTextFetcher,
    user: &AuthenticatedUser,
    request: &CoverLetterRequest,
) -> Result<CoverLetterResponse, AppError> {
    let role = get_role(pool, request.role_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Role {} not found", request.role_id)))?;

    let profile = load_complete_profile(pool, user.id).await?;

    info!(
        "Generating cover letter for {} - {} (user {})",
        role.company_name, role.role_title, user.id
    );

    let (company_page, role_page) =
        tokio::join!(pages.fetch(&role.company_link), pages.fetch(&role.role_link));

    let prompt = build_prompt(&PromptInputs {
        role: &role,
        profile: &profile,
        additional_notes: request.additional_notes.as_deref(),
        company_page: company_page.into_text(),
        role_page: role_page.into_text(),
    });

    let cover_letter = llm
        .complete(&prompt, COVER_LETTER_SYSTEM, COVER_LETTER_PARAMS)
        .await?;

    let mut tx = begin_user_scope(pool, user.id).await?;
    let application = save_cover_letter(&mut *tx, user.id, role.id, &cover_letter).await?;
    tx.commit().await?;

    info!(
        "Stored cover letter ({} chars) on application {}",
        cover_letter.chars().count(),
        application.id
    );

    Ok(CoverLetterResponse {
        role_id: role.id,
        application_id: application.id,
        cover_letter,
        model: llm.model().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    use crate::profile::repository::{upsert_profile, ProfileUpdate};

    fn role() -> GraduateRoleRow {
        GraduateRoleRow {
            id: Uuid::new_v4(),
            category: "Bulge Bracket".to_string(),
            company_name: "Goldman Sachs".to_string(),
            company_link: "https://app.the-trackr.com/companies/goldman-sachs".to_string(),
            role_title: "2025 Investment Banking Analyst".to_string(),
            role_link: "https://higher.gs.com/roles/123".to_string(),
            application_opens: NaiveDate::from_ymd_opt(2024, 9, 1),
            application_closes: None,
            last_year_opened: None,
            interview_stages: "HireVue, Superday".to_string(),
            assessment_platform: "HireVue".to_string(),
            online_application: "Yes".to_string(),
            cv_required: "Yes".to_string(),
            cover_letter: "Yes".to_string(),
            test_required: "No".to_string(),
            notes: "Rolling basis".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn profile() -> UserProfileRow {
        UserProfileRow {
            full_name: Some("Ada Lovelace".to_string()),
            university: Some("University of Warwick".to_string()),
            degree: Some("BSc Mathematics".to_string()),
            graduation_year: Some(2025),
            skills: vec!["Excel".to_string(), "Python".to_string()],
            experience: Some("Spring week at Barclays".to_string()),
            ..UserProfileRow::empty(Uuid::new_v4(), Some("ada@example.com".to_string()))
        }
    }

    #[test]
    fn test_candidate_summary_lists_filled_fields_in_order() {
        let summary = candidate_summary(&profile());
        assert_eq!(
            summary,
            "Name: Ada Lovelace\n\
             University: University of Warwick\n\
             Degree: BSc Mathematics\n\
             Graduation Year: 2025\n\
             Skills: Excel, Python\n\
             Experience: Spring week at Barclays"
        );
    }

    #[test]
    fn test_candidate_summary_empty_profile() {
        let summary = candidate_summary(&UserProfileRow::empty(Uuid::new_v4(), None));
        assert_eq!(summary, "No profile information provided");
    }

    #[test]
    fn test_prompt_interpolates_role_profile_and_pages() {
        let role = role();
        let profile = profile();
        let prompt = build_prompt(&PromptInputs {
            role: &role,
            profile: &profile,
            additional_notes: Some("Mention my interest in TMT"),
            company_page: Some("Goldman Sachs is a leading global bank.".to_string()),
            role_page: Some("Analysts support deal teams.".to_string()),
        });

        assert!(prompt.contains("Company: Goldman Sachs"));
        assert!(prompt.contains("Role: 2025 Investment Banking Analyst"));
        assert!(prompt.contains("Additional Notes: Rolling basis; Mention my interest in TMT"));
        assert!(prompt.contains("Company information from tracker:\nGoldman Sachs is a leading global bank."));
        assert!(prompt.contains("Detailed role description:\nAnalysts support deal teams."));
        assert!(prompt.contains("Name: Ada Lovelace"));
        assert!(!prompt.contains('{'), "every placeholder is filled");
    }

    #[test]
    fn test_prompt_omits_unavailable_pages() {
        let role = role();
        let profile = profile();
        let prompt = build_prompt(&PromptInputs {
            role: &role,
            profile: &profile,
            additional_notes: None,
            company_page: None,
            role_page: None,
        });

        assert!(!prompt.contains(COMPANY_CONTEXT_HEADING));
        assert!(!prompt.contains(ROLE_CONTEXT_HEADING));
        assert!(prompt.contains("Additional Notes: Rolling basis\n"));
    }

    #[test]
    fn test_placeholders_in_scraped_text_stay_literal() {
        let mut role = role();
        role.company_name = "{candidate} Capital".to_string();
        let profile = profile();
        let prompt = build_prompt(&PromptInputs {
            role: &role,
            profile: &profile,
            additional_notes: None,
            company_page: Some("About us {role_context} {notes}".to_string()),
            role_page: None,
        });

        assert!(prompt.contains("Company: {candidate} Capital\n"));
        assert!(prompt.contains("About us {role_context} {notes}"));
        assert_eq!(prompt.matches("Name: Ada Lovelace").count(), 1);
    }

    #[test]
    fn test_fill_template_leaves_unknown_and_unclosed_braces() {
        let filled = fill_template("a {x} {y} {z", &[("x", "1")]);
        assert_eq!(filled, "a 1 {y} {z");
    }

    async fn seed_role(pool: &PgPool) -> Uuid {
        // Blank links keep page fetching off the network.
        sqlx::query_scalar(
            "INSERT INTO graduate_roles (company_name, role_title) VALUES ('Goldman Sachs', 'IB Analyst') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn save_profile(pool: &PgPool, user: &AuthenticatedUser, update: ProfileUpdate) {
        let mut tx = begin_user_scope(pool, user.id).await.unwrap();
        upsert_profile(&mut *tx, user.id, user.email.as_deref(), &update)
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    async fn application_count(pool: &PgPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM user_applications")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn unreachable_llm() -> LlmClient {
        LlmClient::new(
            "sk-test".to_string(),
            "http://127.0.0.1:1".to_string(),
            "gpt-4o-mini".to_string(),
        )
        .unwrap()
    }

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            id: Uuid::new_v4(),
            email: Some("ada@example.com".to_string()),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_unreachable_completion_api_writes_nothing(pool: PgPool) {
        let role_id = seed_role(&pool).await;
        let user = user();
        save_profile(
            &pool,
            &user,
            ProfileUpdate {
                full_name: Some("Ada Lovelace".to_string()),
                university: Some("LSE".to_string()),
                degree: Some("BSc Economics".to_string()),
                skills: vec!["Excel".to_string()],
                ..Default::default()
            },
        )
        .await;

        let result = generate_cover_letter(
            &pool,
            &unreachable_llm(),
            &PageTextFetcher::new().unwrap(),
            &user,
            &CoverLetterRequest {
                role_id,
                additional_notes: None,
            },
        )
        .await;

        assert!(matches!(result, Err(AppError::Llm(_))));
        assert_eq!(application_count(&pool).await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_incomplete_profile_rejected_without_write(pool: PgPool) {
        let role_id = seed_role(&pool).await;
        let user = user();
        save_profile(
            &pool,
            &user,
            ProfileUpdate {
                full_name: Some("Ada Lovelace".to_string()),
                ..Default::default()
            },
        )
        .await;

        let result = generate_cover_letter(
            &pool,
            &unreachable_llm(),
            &PageTextFetcher::new().unwrap(),
            &user,
            &CoverLetterRequest {
                role_id,
                additional_notes: None,
            },
        )
        .await;

        match result {
            Err(AppError::UnprocessableEntity(message)) => {
                assert!(message.contains("university"));
                assert!(message.contains("experience_or_skills"));
            }
            other => panic!("expected incomplete profile error, got {other:?}"),
        }
        assert_eq!(application_count(&pool).await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_unknown_role_is_not_found(pool: PgPool) {
        let result = generate_cover_letter(
            &pool,
            &unreachable_llm(),
            &PageTextFetcher::new().unwrap(),
            &user(),
            &CoverLetterRequest {
                role_id: Uuid::new_v4(),
                additional_notes: None,
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_request_body_shape() {
        let request: CoverLetterRequest = serde_json::from_str(
            r#"{"role_id": "6f1c2b4e-4c1a-4f0e-9a55-0d3c1b2a9e11"}"#,
        )
        .unwrap();
        assert!(request.additional_notes.is_none());
        assert!(serde_json::from_str::<CoverLetterRequest>(r#"{"company": "GS"}"#).is_err());
    }
}
