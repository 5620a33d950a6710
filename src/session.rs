//! One song URL, from validation to finished PDFs.

use std::path::Path;

use crate::assemble;
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::fetch::{BlobFetcher, HttpFetcher};
use crate::preview::PageSurface;
use crate::preview::traversal::{self, TraversalOptions};
use crate::preview::webdriver::WebDriverSurface;
use crate::results::{AssemblyReport, SessionReport, TraversalReport};
use crate::ui::Console;
use crate::urls;

/// Download every preview page of `url` into `target` and assemble the PDFs.
///
/// `Err` means this URL could not be processed at all; the caller moves on to
/// the next one. Once a browser session existed, whatever was downloaded is
/// still assembled before returning.
pub async fn process_url(
    console: &Console,
    config: &AppConfig,
    fetcher: &HttpFetcher,
    url: &str,
    target: &Path,
) -> Result<SessionReport> {
    let normalized = urls::normalize_url(url).ok_or_else(|| Error::InvalidUrl(url.to_string()))?;
    if !urls::is_song_details_url(&normalized) {
        return Err(Error::UnsupportedUrl(normalized));
    }
    if urls::redirects_to_domain_root(&normalized, fetcher.client(), config.http_head_timeout())
        .await
    {
        return Err(Error::RedirectsToRoot(url.to_string()));
    }

    clear_target(console, target)?;

    let surface = WebDriverSurface::connect(config).await.inspect_err(|_| {
        console.info("Ensure Firefox and geckodriver are installed and geckodriver is running.");
    })?;

    let options = TraversalOptions::from(config);
    let walked = walk(&surface, fetcher, &normalized, target, &options).await;

    if let Err(e) = surface.close().await {
        ::log::warn!("Failed to close browser session: {}", e);
    }

    finish(console, target, walked)
}

async fn walk<S, F>(
    surface: &S,
    fetcher: &F,
    url: &str,
    target: &Path,
    options: &TraversalOptions,
) -> Result<TraversalReport>
where
    S: PageSurface,
    F: BlobFetcher + ?Sized,
{
    traversal::open_preview(surface, url, options).await?;
    traversal::traverse(surface, fetcher, target, options).await
}

/// Assemble whatever the walk left in `target`, whether or not it succeeded
fn finish(
    console: &Console,
    target: &Path,
    walked: Result<TraversalReport>,
) -> Result<SessionReport> {
    let assembly = if target.is_dir() {
        assemble::assemble(console, target)
    } else {
        AssemblyReport::default()
    };

    let traversal = walked?;
    console.success(&format!(
        "{} page(s) found, {} downloaded, {} PDF(s) created",
        traversal.pages.len(),
        traversal.saved(),
        assembly.created()
    ));
    Ok(SessionReport {
        target: target.to_path_buf(),
        traversal,
        assembly,
    })
}

/// Remove whatever sits at `target` so the traversal starts from an empty directory
pub fn clear_target(console: &Console, target: &Path) -> Result<()> {
    let Ok(metadata) = std::fs::symlink_metadata(target) else {
        return Ok(());
    };

    let cleared = if metadata.is_dir() {
        console.warning(&format!("Overwriting directory: {}", target.display()));
        std::fs::remove_dir_all(target)
    } else {
        console.warning(&format!(
            "A file exists at target path; removing file: {}",
            target.display()
        ));
        std::fs::remove_file(target)
    };

    cleared.map_err(|e| {
        console.error(&format!(
            "Failed to clear target path '{}': {}",
            target.display(),
            e
        ));
        Error::Io(e)
    })
}
