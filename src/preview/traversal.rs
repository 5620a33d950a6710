//! Walks the preview carousel exactly once.
//!
//! The viewer is a two-pane sliding carousel: slot 1 holds the page that is
//! leaving, slot 2 the page that is arriving together with the only reliable
//! "next" button. Every step therefore reads and acts on slot 2.
//!
//! The cycle check compares stripped filenames only. Two different pages that
//! share a basename would end the walk early; that heuristic is kept as is.

use std::path::Path;
use std::time::Duration;
use tokio::time::{Instant, sleep};

use super::{
    ADVANCE_CONTROL, FIRST_SLOT_IMAGE, LOADING_INDICATOR, PREVIEW_CONTAINER, PageSurface,
    SHEET_WRAPPER, SLOT_IMAGE,
};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::fetch::BlobFetcher;
use crate::naming;
use crate::results::{PageRecord, TraversalEnd, TraversalReport};

/// Waits used while driving the carousel
#[derive(Debug, Clone, Copy)]
pub struct TraversalOptions {
    /// General element wait (loading indicator, container, first page)
    pub element_wait: Duration,
    /// Bound on the DOM mutation after an advance
    pub page_change_wait: Duration,
    pub poll_interval: Duration,
}

impl From<&AppConfig> for TraversalOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            element_wait: config.element_wait(),
            page_change_wait: config.page_change_wait(),
            poll_interval: config.poll_interval(),
        }
    }
}

/// Load the song page and wait for the preview to render.
///
/// A loading indicator that never disappears is only a warning; a preview
/// container that never shows up is an error.
pub async fn open_preview<S: PageSurface>(
    surface: &S,
    url: &str,
    options: &TraversalOptions,
) -> Result<()> {
    surface.navigate(url).await?;

    if let Err(e) = surface
        .wait_until_invisible(LOADING_INDICATOR, options.element_wait)
        .await
    {
        ::log::warn!("Loading indicator did not disappear in time, continuing anyway: {}", e);
    }

    surface
        .wait_until_visible(PREVIEW_CONTAINER, options.element_wait)
        .await?;
    Ok(())
}

/// Walk the carousel, handing every new page to `fetcher` as it is seen.
///
/// Returns `Err(Error::NoInitialContent)` only when the first page cannot be
/// read. Every later problem ends the walk with the pages collected so far.
pub async fn traverse<S, F>(
    surface: &S,
    fetcher: &F,
    session_dir: &Path,
    options: &TraversalOptions,
) -> Result<TraversalReport>
where
    S: PageSurface,
    F: BlobFetcher + ?Sized,
{
    let first_url = match first_image_url(surface, options).await {
        Ok(Some(url)) => url,
        Ok(None) => {
            ::log::error!("First preview image has no source URL");
            return Err(Error::NoInitialContent);
        }
        Err(e) => {
            ::log::error!("Could not locate first preview image: {}", e);
            return Err(Error::NoInitialContent);
        }
    };

    let anchor = PageRecord::from_url(&first_url);
    ::log::info!(
        "Anchor page {} ({})",
        anchor.filename,
        anchor.instrument_tag
    );

    let mut walk = Walk {
        session_dir,
        report: TraversalReport {
            pages: Vec::new(),
            fetches: Vec::new(),
            end: TraversalEnd::CycleComplete,
        },
    };
    let anchor_filename = anchor.filename.clone();
    walk.emit(fetcher, anchor).await;

    let end = loop {
        match step(surface, fetcher, &mut walk, &anchor_filename, options).await {
            Ok(None) => continue,
            Ok(Some(end)) => break end,
            Err(e) => break TraversalEnd::SurfaceFailure(e.to_string()),
        }
    };

    ::log::info!(
        "Traversal finished after {} page(s): {}",
        walk.report.pages.len(),
        end
    );
    walk.report.end = end;
    Ok(walk.report)
}

/// Collected state of one walk
struct Walk<'a> {
    session_dir: &'a Path,
    report: TraversalReport,
}

impl Walk<'_> {
    async fn emit<F: BlobFetcher + ?Sized>(&mut self, fetcher: &F, record: PageRecord) {
        ::log::debug!("Page {}: {}", self.report.pages.len() + 1, record.image_url);
        let destination = record.destination(self.session_dir);
        let outcome = fetcher.fetch(&record.image_url, &destination).await;
        self.report.pages.push(record);
        self.report.fetches.push(outcome);
    }
}

async fn first_image_url<S: PageSurface>(
    surface: &S,
    options: &TraversalOptions,
) -> Result<Option<String>> {
    let image = surface
        .wait_until_visible(FIRST_SLOT_IMAGE, options.element_wait)
        .await?;
    Ok(usable_src(surface.read_attribute(&image, "src").await?))
}

/// One carousel step. `Ok(None)` means the carousel advanced to a new page.
async fn step<S, F>(
    surface: &S,
    fetcher: &F,
    walk: &mut Walk<'_>,
    anchor_filename: &str,
    options: &TraversalOptions,
) -> Result<Option<TraversalEnd>>
where
    S: PageSurface,
    F: BlobFetcher + ?Sized,
{
    let slots = surface.query_all(SHEET_WRAPPER).await?;
    let Some(arriving) = slots.get(1) else {
        return Ok(Some(TraversalEnd::SinglePage));
    };

    let Some(url) = slot_image_url(surface, arriving).await? else {
        return Ok(Some(TraversalEnd::SlotImageMissing));
    };

    let record = PageRecord::from_url(&url);
    if record.filename == anchor_filename {
        return Ok(Some(TraversalEnd::CycleComplete));
    }
    walk.emit(fetcher, record).await;

    let Some(control) = surface.find_within(arriving, ADVANCE_CONTROL).await? else {
        return Ok(Some(TraversalEnd::NoAdvanceControl));
    };
    surface.activate(&control).await?;

    if wait_for_advance(surface, &url, options).await? {
        Ok(None)
    } else {
        Ok(Some(TraversalEnd::AdvanceTimedOut))
    }
}

async fn slot_image_url<S: PageSurface>(surface: &S, slot: &S::Element) -> Result<Option<String>> {
    let Some(image) = surface.find_within(slot, SLOT_IMAGE).await? else {
        return Ok(None);
    };
    Ok(usable_src(surface.read_attribute(&image, "src").await?))
}

/// A source only counts when it names a file; `.../previews/` has no page to save
fn usable_src(src: Option<String>) -> Option<String> {
    src.filter(|src| !naming::page_filename(src).is_empty())
}

/// Poll until slot 2 shows an image URL other than `previous`.
///
/// `Ok(false)` on timeout. A slot or image that vanishes mid-wait is an error.
async fn wait_for_advance<S: PageSurface>(
    surface: &S,
    previous: &str,
    options: &TraversalOptions,
) -> Result<bool> {
    let deadline = Instant::now() + options.page_change_wait;
    loop {
        let slots = surface.query_all(SHEET_WRAPPER).await?;
        let arriving = slots
            .get(1)
            .ok_or_else(|| Error::Surface("second slot disappeared during advance".to_string()))?;
        let image = surface
            .find_within(arriving, SLOT_IMAGE)
            .await?
            .ok_or_else(|| Error::Surface("slot image disappeared during advance".to_string()))?;

        let current = surface.read_attribute(&image, "src").await?;
        if current.as_deref() != Some(previous) {
            return Ok(true);
        }
        if Instant::now() >= deadline {
            ::log::warn!(
                "Carousel did not advance within {:?}; assuming last page",
                options.page_change_wait
            );
            return Ok(false);
        }
        sleep(options.poll_interval).await;
    }
}
