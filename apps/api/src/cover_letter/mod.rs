// Cover letter generation: profile + scraped role/company text interpolated into a
// fixed prompt, sent to the completion API, and stored on the user's application.
// All completion calls go through llm_client.

pub mod generator;
pub mod handlers;
pub mod page_text;
pub mod prompts;
