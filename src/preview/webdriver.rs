use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tokio::time::{Instant, sleep};

use super::PageSurface;
use crate::config::AppConfig;
use crate::error::{Error, Result};

/// Endpoints tried after the configured one
const FALLBACK_WEBDRIVER_URLS: [&str; 1] = ["http://127.0.0.1:4444"];

/// A live Firefox session driven over WebDriver
pub struct WebDriverSurface {
    client: Client,
    poll_interval: Duration,
}

impl WebDriverSurface {
    /// Open a browser session, trying the configured endpoint and then the fallbacks
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let capabilities = firefox_capabilities(config.headless);

        let mut last_error = None;
        let candidates = std::iter::once(config.webdriver_url.as_str()).chain(
            FALLBACK_WEBDRIVER_URLS
                .iter()
                .copied()
                .filter(|url| *url != config.webdriver_url),
        );

        for url in candidates {
            let mut builder = ClientBuilder::native();
            builder.capabilities(capabilities.clone());
            match builder.connect(url).await {
                Ok(client) => {
                    ::log::debug!("Connected to WebDriver at {}", url);
                    return Ok(Self {
                        client,
                        poll_interval: config.poll_interval(),
                    });
                }
                Err(e) => {
                    ::log::debug!("Failed to connect to WebDriver at {}: {}", url, e);
                    last_error = Some(e);
                }
            }
        }

        ::log::error!(
            "Make sure geckodriver is running or set the WEBDRIVER_URL environment variable"
        );
        Err(last_error
            .map(Error::from)
            .unwrap_or_else(|| Error::WebDriver("no WebDriver endpoint configured".to_string())))
    }

    /// End the browser session
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }

    async fn first_displayed(&self, selector: &str) -> Result<Option<Element>> {
        for element in self.client.find_all(Locator::Css(selector)).await? {
            // Elements can go stale between lookup and the display check
            if element.is_displayed().await.unwrap_or(false) {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }
}

fn firefox_capabilities(headless: bool) -> Map<String, Value> {
    let args: Vec<&str> = if headless { vec!["-headless"] } else { vec![] };
    let mut capabilities = Map::new();
    capabilities.insert("browserName".to_string(), json!("firefox"));
    capabilities.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
    capabilities
}

#[async_trait]
impl PageSurface for WebDriverSurface {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        ::log::debug!("Navigating to {}", url);
        self.client.goto(url).await?;
        Ok(())
    }

    async fn wait_until_visible(&self, selector: &str, timeout: Duration) -> Result<Element> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(element) = self.first_displayed(selector).await? {
                return Ok(element);
            }
            if Instant::now() >= deadline {
                return Err(Error::Timeout(format!("'{selector}' to become visible")));
            }
            sleep(self.poll_interval).await;
        }
    }

    async fn wait_until_invisible(&self, selector: &str, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.first_displayed(selector).await?.is_none() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::Timeout(format!("'{selector}' to disappear")));
            }
            sleep(self.poll_interval).await;
        }
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Element>> {
        Ok(self.client.find_all(Locator::Css(selector)).await?)
    }

    async fn find_within(&self, element: &Element, selector: &str) -> Result<Option<Element>> {
        match element.find(Locator::Css(selector)).await {
            Ok(found) => Ok(Some(found)),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        Ok(element.attr(name).await?)
    }

    async fn activate(&self, element: &Element) -> Result<()> {
        // A script click works on panes that are mid-slide and not interactable
        let handle = serde_json::to_value(element).map_err(|e| Error::Surface(e.to_string()))?;
        self.client
            .execute("arguments[0].click();", vec![handle])
            .await?;
        Ok(())
    }
}
