//! Tracker page parser: turns the rendered listing table into `ScrapedRole`s.

use std::collections::HashMap;

use chrono::NaiveDate;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use super::ScrapeError;

/// Category header rows are recognised by containing one of these labels.
const CATEGORY_KEYWORDS: &[&str] = &[
    "Bulge Bracket",
    "Elite Boutique",
    "Middle Market",
    "Buy-Side",
    "Asset Management",
    "Big 4",
    "Consulting",
    "Trading",
    "Quant",
    "Pensions",
    "Insurance",
    "Accounting",
    "Audit",
    "Miscellaneous",
    "Sponsors",
];

/// Company cells that are banners rather than employers.
const SKIPPED_COMPANIES: &[&str] = &["Sponsors", "Trackr Exclusive"];

const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Tracker dates look like `15 Sep 24`.
const TRACKER_DATE_FORMAT: &str = "%d %b %y";

/// A role row as read from the tracker, ready to store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedRole {
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
}

impl ScrapedRole {
    /// Natural identity of a listing across scrape runs.
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.category, &self.company_name, &self.role_title)
    }
}

/// Parses a `DD Mon YY` tracker date. Blank or unrecognised text is `None`.
pub fn parse_tracker_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(text, TRACKER_DATE_FORMAT).ok()
}

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector(format!("{css}: {e}")))
}

/// Text content of an element with whitespace-only nodes dropped.
fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Absolute URL of the first link inside `cell`, or empty if there is none.
fn cell_link(cell: &ElementRef<'_>, anchor: &Selector, base: &Url) -> String {
    cell.select(anchor)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty())
        .and_then(|href| base.join(href).ok())
        .map(String::from)
        .unwrap_or_default()
}

/// Parses every role row in the tracker page.
///
/// Rows are read top to bottom; a short row whose text names a known category
/// switches the category applied to the role rows that follow it.
pub fn parse_tracker_page(html: &str, base_url: &str) -> Result<Vec<ScrapedRole>, ScrapeError> {
    let base = Url::parse(base_url).map_err(|e| ScrapeError::InvalidUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;
    let anchor_sel = selector("a[href]")?;

    let document = Html::parse_document(html);
    let mut current_category = DEFAULT_CATEGORY.to_string();
    let mut roles = Vec::new();

    for row in document.select(&row_sel) {
        let cells: Vec<ElementRef<'_>> = row.select(&cell_sel).collect();

        if cells.len() < 5 {
            let text = element_text(&row);
            if !text.is_empty()
                && cells.len() <= 2
                && CATEGORY_KEYWORDS.iter().any(|k| text.contains(k))
            {
                current_category = text;
            }
            continue;
        }

        let text_at = |i: usize| cells.get(i).map(element_text).unwrap_or_default();

        let company_name = text_at(1);
        if company_name.is_empty() || SKIPPED_COMPANIES.contains(&company_name.as_str()) {
            continue;
        }

        roles.push(ScrapedRole {
            category: current_category.clone(),
            company_link: cell_link(&cells[1], &anchor_sel, &base),
            company_name,
            role_title: text_at(2),
            role_link: cell_link(&cells[2], &anchor_sel, &base),
            application_opens: parse_tracker_date(&text_at(3)),
            application_closes: parse_tracker_date(&text_at(4)),
            last_year_opened: parse_tracker_date(&text_at(5)),
            interview_stages: text_at(6),
            assessment_platform: text_at(7),
            online_application: text_at(8),
            cv_required: text_at(9),
            cover_letter: text_at(10),
            test_required: text_at(11),
            notes: text_at(12),
        });
    }

    Ok(roles)
}

/// Collapses repeated listings so each (category, company, role) appears once.
/// The last occurrence wins; first-seen order is kept.
pub fn dedupe_by_key(roles: Vec<ScrapedRole>) -> Vec<ScrapedRole> {
    let mut positions: HashMap<(String, String, String), usize> = HashMap::new();
    let mut unique: Vec<ScrapedRole> = Vec::with_capacity(roles.len());

    for role in roles {
        let key = {
            let (category, company, title) = role.key();
            (category.to_string(), company.to_string(), title.to_string())
        };
        match positions.get(&key) {
            Some(&i) => unique[i] = role,
            None => {
                positions.insert(key, unique.len());
                unique.push(role);
            }
        }
    }

    unique
}
