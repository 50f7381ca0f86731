//! Fetches a role or company page and reduces it to readable text for the prompt.

use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE},
    Client, StatusCode,
};
use scraper::Html;
use tracing::{info, warn};

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Prompt context per page is capped at this many characters.
pub const MAX_PAGE_CHARS: usize = 5000;

/// Elements whose text is page chrome rather than content.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "header", "footer", "nav", "noscript"];

/// Result of fetching one linked page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageText {
    Text(String),
    /// The page could not be used; the reason is for logs only.
    Unavailable(String),
}

impl PageText {
    pub fn into_text(self) -> Option<String> {
        match self {
            PageText::Text(text) => Some(text),
            PageText::Unavailable(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct PageTextFetcher {
    client: Client,
}

impl PageTextFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-GB,en;q=0.5"));
        headers.insert("DNT", HeaderValue::from_static("1"));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));

        Ok(Self {
            client: Client::builder()
                .timeout(FETCH_TIMEOUT)
                .user_agent(USER_AGENT)
                .default_headers(headers)
                .build()?,
        })
    }

    /// Fetches `url` and extracts its visible text. Never fails: problems are
    /// reported as `PageText::Unavailable` so generation can continue without them.
    pub async fn fetch(&self, url: &str) -> PageText {
        let url = url.trim();
        if url.is_empty() {
            return PageText::Unavailable("no link".to_string());
        }

        info!("Fetching page content from {url}");
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Error fetching {url}: {e}");
                return PageText::Unavailable(e.to_string());
            }
        };

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            warn!("Access denied (403) for {url}");
            return PageText::Unavailable("access denied".to_string());
        }
        if !status.is_success() {
            warn!("HTTP {status} fetching {url}");
            return PageText::Unavailable(format!("HTTP {}", status.as_u16()));
        }

        match response.text().await {
            Ok(body) => {
                let text = extract_visible_text(&body, MAX_PAGE_CHARS);
                info!("Fetched {} characters from {url}", text.chars().count());
                if text.is_empty() {
                    PageText::Unavailable("empty page".to_string())
                } else {
                    PageText::Text(text)
                }
            }
            Err(e) => {
                warn!("Error reading body of {url}: {e}");
                PageText::Unavailable(e.to_string())
            }
        }
    }
}

/// Visible text of an HTML document with page chrome removed, whitespace
/// collapsed to single spaces, and the result cut to `max_chars` characters.
pub fn extract_visible_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let mut words: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let skipped = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if !skipped {
            words.extend(text.split_whitespace());
        }
    }

    words.join(" ").chars().take(max_chars).collect()
}
