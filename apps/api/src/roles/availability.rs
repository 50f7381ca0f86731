use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::role::GraduateRoleRow;

/// A role is open when it has opened on or before `today` and has either no
/// closing date or closes on or after `today`.
pub fn is_open(opens: Option<NaiveDate>, closes: Option<NaiveDate>, today: NaiveDate) -> bool {
    match opens {
        Some(opens) if opens <= today => closes.map_or(true, |closes| closes >= today),
        _ => false,
    }
}

/// A role as returned by the API, with its open state for today.
#[derive(Debug, Clone, Serialize)]
pub struct RoleView {
    #[serde(flatten)]
    pub role: GraduateRoleRow,
    pub is_open: bool,
}

impl RoleView {
    pub fn new(role: GraduateRoleRow, today: NaiveDate) -> Self {
        let is_open = is_open(role.application_opens, role.application_closes, today);
        RoleView { role, is_open }
    }
}

/// Query-string filters for `GET /api/roles`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleFilter {
    /// Only `true` (any case) restricts to open roles; anything else is ignored.
    pub open: Option<String>,
    pub category: Option<String>,
    /// Case-insensitive substring of company name or role title.
    pub q: Option<String>,
}

impl RoleFilter {
    pub fn open_only(&self) -> bool {
        self.open
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    pub fn matches(&self, view: &RoleView) -> bool {
        if self.open_only() && !view.is_open {
            return false;
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if view.role.category != category {
                return false;
            }
        }
        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let q = q.to_lowercase();
            if !view.role.company_name.to_lowercase().contains(&q)
                && !view.role.role_title.to_lowercase().contains(&q)
            {
                return false;
            }
        }
        true
    }
}

/// Annotates roles with their open state and keeps those matching `filter`.
/// Input order is preserved.
pub fn filter_roles(
    roles: Vec<GraduateRoleRow>,
    filter: &RoleFilter,
    today: NaiveDate,
) -> Vec<RoleView> {
    roles
        .into_iter()
        .map(|role| RoleView::new(role, today))
        .filter(|view| filter.matches(view))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn role(company: &str, opens: Option<&str>, closes: Option<&str>) -> GraduateRoleRow {
        GraduateRoleRow {
            id: Uuid::new_v4(),
            category: "Bulge Bracket".to_string(),
            company_name: company.to_string(),
            company_link: String::new(),
            role_title: "Investment Banking Summer Analyst".to_string(),
            role_link: String::new(),
            application_opens: opens.map(date),
            application_closes: closes.map(date),
            last_year_opened: None,
            interview_stages: String::new(),
            assessment_platform: String::new(),
            online_application: String::new(),
            cv_required: "Yes".to_string(),
            cover_letter: "No".to_string(),
            test_required: "Yes".to_string(),
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_open_range_is_inclusive() {
        let today = date("2024-10-01");
        assert!(is_open(Some(today), Some(today), today));
        assert!(is_open(Some(date("2024-09-01")), None, today));
        assert!(is_open(Some(date("2024-09-01")), Some(date("2024-11-30")), today));
    }

    #[test]
    fn test_not_open_outside_range() {
        let today = date("2024-10-01");
        assert!(!is_open(Some(date("2024-10-02")), None, today), "not opened yet");
        assert!(
            !is_open(Some(date("2024-09-01")), Some(date("2024-09-30")), today),
            "already closed"
        );
        assert!(!is_open(None, Some(date("2024-12-01")), today), "no open date");
        assert!(!is_open(None, None, today));
    }

    #[test]
    fn test_open_filter_returns_exactly_open_rows() {
        let today = date("2024-10-01");
        let roles = vec![
            role("Goldman Sachs", Some("2024-09-01"), None),
            role("JP Morgan", Some("2024-10-15"), None),
            role("Morgan Stanley", Some("2024-08-01"), Some("2024-09-15")),
            role("Barclays", None, None),
            role("Citi", Some("2024-10-01"), Some("2024-10-01")),
        ];
        let filter = RoleFilter {
            open: Some("true".to_string()),
            ..Default::default()
        };
        let open: Vec<_> = filter_roles(roles, &filter, today)
            .into_iter()
            .map(|v| v.role.company_name)
            .collect();
        assert_eq!(open, vec!["Goldman Sachs", "Citi"]);
    }

    #[test]
    fn test_unfiltered_listing_keeps_all_rows_with_flags() {
        let today = date("2024-10-01");
        let roles = vec![
            role("Goldman Sachs", Some("2024-09-01"), None),
            role("Barclays", None, None),
        ];
        let views = filter_roles(roles, &RoleFilter::default(), today);
        assert_eq!(views.len(), 2);
        assert!(views[0].is_open);
        assert!(!views[1].is_open);
    }

    #[test]
    fn test_search_matches_company_or_title_case_insensitively() {
        let today = date("2024-10-01");
        let roles = vec![
            role("Goldman Sachs", None, None),
            role("Rothschild & Co", None, None),
        ];
        let filter = RoleFilter {
            q: Some("GOLDMAN".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_roles(roles.clone(), &filter, today).len(), 1);

        let filter = RoleFilter {
            q: Some("summer analyst".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_roles(roles, &filter, today).len(), 2);
    }

    #[test]
    fn test_category_filter_is_exact() {
        let today = date("2024-10-01");
        let mut quant = role("Jane Street", None, None);
        quant.category = "Quant".to_string();
        let roles = vec![role("Goldman Sachs", None, None), quant];
        let filter = RoleFilter {
            category: Some("Quant".to_string()),
            ..Default::default()
        };
        let views = filter_roles(roles, &filter, today);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].role.company_name, "Jane Street");
    }

    fn query(uri: &str) -> RoleFilter {
        let uri: axum::http::Uri = uri.parse().unwrap();
        axum::extract::Query::<RoleFilter>::try_from_uri(&uri)
            .unwrap()
            .0
    }

    #[test]
    fn test_open_query_value_is_lenient() {
        assert!(query("/api/roles?open=true").open_only());
        assert!(query("/api/roles?open=True").open_only());
        assert!(!query("/api/roles?open=1").open_only());
        assert!(!query("/api/roles?open=").open_only());
        assert!(!query("/api/roles?open=false").open_only());
        assert!(!query("/api/roles").open_only());
    }

    #[test]
    fn test_role_view_flattens_row() {
        let today = date("2024-10-01");
        let view = RoleView::new(role("Goldman Sachs", Some("2024-09-01"), None), today);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["company_name"], "Goldman Sachs");
        assert_eq!(json["is_open"], true);
        assert_eq!(json["application_opens"], "2024-09-01");
    }
}
