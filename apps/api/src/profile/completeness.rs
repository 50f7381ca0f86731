use serde::Serialize;

use crate::models::profile::UserProfileRow;

/// Which profile fields still block cover-letter generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileCompleteness {
    pub complete: bool,
    pub missing: Vec<&'static str>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// A profile is complete when it names the candidate, their education, and
/// at least some experience or skills to write about.
pub fn check_profile(profile: &UserProfileRow) -> ProfileCompleteness {
    let mut missing = Vec::new();

    if is_blank(&profile.full_name) {
        missing.push("full_name");
    }
    if is_blank(&profile.university) {
        missing.push("university");
    }
    if is_blank(&profile.degree) {
        missing.push("degree");
    }
    let has_skills = profile.skills.iter().any(|s| !s.trim().is_empty());
    if is_blank(&profile.experience) && !has_skills {
        missing.push("experience_or_skills");
    }

    ProfileCompleteness {
        complete: missing.is_empty(),
        missing,
    }
}
