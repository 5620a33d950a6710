use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

/// Runtime configuration for a download run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root directory for downloaded charts
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Run the browser without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// URL for the WebDriver instance (geckodriver)
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Timeout for page image downloads
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Timeout for the redirect probe issued before a session starts
    #[serde(default = "default_http_head_timeout_secs")]
    pub http_head_timeout_secs: u64,

    /// General element wait (loading indicator, preview container, first page)
    #[serde(default = "default_element_wait_secs")]
    pub element_wait_secs: u64,

    /// Wait for the carousel to show a new page after an advance
    #[serde(default = "default_page_change_wait_secs")]
    pub page_change_wait_secs: u64,

    /// Polling interval used by every wait
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// User agent sent with HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Override the WebDriver URL with the `WEBDRIVER_URL` environment variable if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn http_head_timeout(&self) -> Duration {
        Duration::from_secs(self.http_head_timeout_secs)
    }

    pub fn element_wait(&self) -> Duration {
        Duration::from_secs(self.element_wait_secs)
    }

    pub fn page_change_wait(&self) -> Duration {
        Duration::from_secs(self.page_change_wait_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            headless: default_headless(),
            webdriver_url: default_webdriver_url(),
            http_timeout_secs: default_http_timeout_secs(),
            http_head_timeout_secs: default_http_head_timeout_secs(),
            element_wait_secs: default_element_wait_secs(),
            page_change_wait_secs: default_page_change_wait_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("charts")
}

fn default_headless() -> bool {
    true
}

/// geckodriver listens here by default
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_http_timeout_secs() -> u64 {
    20
}

fn default_http_head_timeout_secs() -> u64 {
    10
}

fn default_element_wait_secs() -> u64 {
    10
}

/// Shorter than the element wait: this is a DOM mutation, not a network round trip
fn default_page_change_wait_secs() -> u64 {
    3
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_user_agent() -> String {
    concat!(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) ",
        "AppleWebKit/537.36 (KHTML, like Gecko) ",
        "Chrome/125.0 Safari/537.36 chart-pages/",
        env!("CARGO_PKG_VERSION")
    )
    .to_string()
}
