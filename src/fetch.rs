//! Page image downloads.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::config::AppConfig;
use crate::error::Result;
use crate::results::FetchOutcome;
use crate::ui::Console;

/// Writes one remote resource to one local path.
///
/// Implementations never fail the caller: every problem is reported in the
/// returned [`FetchOutcome`].
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    async fn fetch(&self, url: &str, destination: &Path) -> FetchOutcome;
}

/// HTTP fetcher sharing one connection pool for the whole process
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    console: Console,
}

impl HttpFetcher {
    pub fn new(config: &AppConfig, console: Console) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, console })
    }

    /// The underlying client, for other requests that should share the pool
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    async fn download(&self, url: &str, destination: &Path) -> Result<FetchOutcome> {
        let mut response = self.client.get(url).send().await?.error_for_status()?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.to_ascii_lowercase().contains("image") {
            return Ok(FetchOutcome::UnexpectedContentType(content_type));
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        let partial = partial_path(destination);
        let mut file = fs::File::create(&partial).await?;
        let mut bytes = 0u64;
        let written: Result<()> = async {
            while let Some(chunk) = response.chunk().await? {
                file.write_all(&chunk).await?;
                bytes += chunk.len() as u64;
            }
            file.flush().await?;
            Ok(())
        }
        .await;
        drop(file);

        if let Err(e) = written {
            let _ = std::fs::remove_file(&partial);
            return Err(e);
        }
        fs::rename(&partial, destination).await?;
        Ok(FetchOutcome::Saved { bytes })
    }
}

/// Sibling file used while a download is in flight
fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

#[async_trait]
impl BlobFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> FetchOutcome {
        if fs::try_exists(destination).await.unwrap_or(false) {
            ::log::debug!("Already downloaded: {}", destination.display());
            return FetchOutcome::AlreadyPresent;
        }

        let name = destination
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.console.info(&format!("Downloading {name}"));

        let outcome = match self.download(url, destination).await {
            Ok(outcome) => outcome,
            Err(e) => FetchOutcome::Failed(e.to_string()),
        };

        match &outcome {
            FetchOutcome::Saved { bytes } => {
                ::log::debug!("Saved {} ({} bytes)", destination.display(), bytes);
            }
            FetchOutcome::UnexpectedContentType(content_type) => {
                self.console.warning(&format!(
                    "Unexpected content type for {url}: {content_type}"
                ));
            }
            FetchOutcome::Failed(e) => {
                self.console.error(&format!("Failed to download {url}: {e}"));
            }
            FetchOutcome::AlreadyPresent => {}
        }
        outcome
    }
}
