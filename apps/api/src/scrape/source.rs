use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thirtyfour::prelude::*;
use thirtyfour::ChromiumLikeCapabilities;
use tracing::{info, warn};

use super::ScrapeError;
use crate::config::Config;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Something that can produce the HTML of the tracker page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError>;

    fn name(&self) -> &'static str;
}

/// Plain GET. Only sees server-rendered markup.
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new() -> Result<Self, ScrapeError> {
        Ok(Self {
            client: Client::builder()
                .timeout(FETCH_TIMEOUT)
                .user_agent(USER_AGENT)
                .build()?,
        })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
        let html = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(html)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Headless Chrome driven through a WebDriver server (e.g. chromedriver).
/// Needed because the tracker table is rendered client-side.
pub struct WebDriverPageSource {
    server_url: String,
    render_wait: Duration,
}

impl WebDriverPageSource {
    pub fn new(server_url: String, render_wait: Duration) -> Self {
        Self {
            server_url,
            render_wait,
        }
    }
}

#[async_trait]
impl PageSource for WebDriverPageSource {
    async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--headless")?;
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-dev-shm-usage")?;

        info!("Opening headless browser via {}", self.server_url);
        let driver = WebDriver::new(self.server_url.as_str(), caps).await?;

        let result: WebDriverResult<String> = async {
            driver.goto(url).await?;
            // Give the client-side table time to render.
            tokio::time::sleep(self.render_wait).await;
            driver.source().await
        }
        .await;

        // The session must be closed even if navigation failed.
        if let Err(e) = driver.quit().await {
            warn!("Failed to close browser session: {e}");
        }

        Ok(result?)
    }

    fn name(&self) -> &'static str {
        "webdriver"
    }
}

/// WebDriver when `WEBDRIVER_URL` is configured, plain HTTP otherwise.
pub fn build_page_source(config: &Config) -> Result<Arc<dyn PageSource>, ScrapeError> {
    Ok(match &config.webdriver_url {
        Some(server_url) => Arc::new(WebDriverPageSource::new(
            server_url.clone(),
            config.scrape_render_wait,
        )),
        None => Arc::new(HttpPageSource::new()?),
    })
}
