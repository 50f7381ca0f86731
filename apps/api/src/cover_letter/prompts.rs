// Prompt constants for cover letter generation.

use crate::llm_client::CompletionParams;

pub const COVER_LETTER_SYSTEM: &str = "You are an expert career advisor specialising in \
    finance graduate applications. Write compelling, professional cover letters.";

pub const COVER_LETTER_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.7,
    max_tokens: 800,
};

/// Cover letter prompt template.
/// Replace: {company}, {role}, {notes}, {company_context}, {role_context}, {candidate}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a professional cover letter for the following graduate role:

Company: {company}
Role: {role}
Additional Notes: {notes}
{company_context}
{role_context}

Candidate Information:
{candidate}

Requirements:
- Professional and enthusiastic tone
- Highlight relevant skills and experience from the candidate's profile
- Reference the specific company and programme
- Keep it concise (250-300 words)
- Format it properly with appropriate paragraphs
- Make it personalised and compelling

Write the cover letter now:"#;

pub const COMPANY_CONTEXT_HEADING: &str = "Company information from tracker:";
pub const ROLE_CONTEXT_HEADING: &str = "Detailed role description:";
