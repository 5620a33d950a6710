use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::naming;

/// One observed carousel page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Image URL as rendered (may carry a signed query string)
    pub image_url: String,

    /// Path basename without query; the dedup key
    pub filename: String,

    /// Instrument part parsed from the filename
    pub instrument_tag: String,
}

impl PageRecord {
    /// Build a page record from an image URL
    pub fn from_url(image_url: &str) -> Self {
        let filename = naming::page_filename(image_url);
        let instrument_tag = naming::instrument_tag(&filename);
        Self {
            image_url: image_url.to_string(),
            filename,
            instrument_tag,
        }
    }

    /// Where this page lands under a session directory
    pub fn destination(&self, session_dir: &Path) -> PathBuf {
        session_dir.join(&self.instrument_tag).join(&self.filename)
    }
}

/// Why a traversal stopped. Every variant is a successful end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraversalEnd {
    /// Slot 2 showed the anchor page again
    CycleComplete,
    /// Fewer than two slots were rendered (single-page preview, or the carousel collapsed)
    SinglePage,
    /// Slot 2 had no image or no image URL
    SlotImageMissing,
    /// Slot 2 carried no advance control
    NoAdvanceControl,
    /// The carousel did not change within the page-change wait
    AdvanceTimedOut,
    /// A browser command failed mid-traversal
    SurfaceFailure(String),
}

impl fmt::Display for TraversalEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraversalEnd::CycleComplete => write!(f, "full cycle observed"),
            TraversalEnd::SinglePage => write!(f, "single page preview"),
            TraversalEnd::SlotImageMissing => write!(f, "next page has no image"),
            TraversalEnd::NoAdvanceControl => write!(f, "no advance control found"),
            TraversalEnd::AdvanceTimedOut => write!(f, "carousel did not advance in time"),
            TraversalEnd::SurfaceFailure(e) => write!(f, "browser error: {e}"),
        }
    }
}

/// Pages observed by one traversal, in carousel order
#[derive(Debug, Clone)]
pub struct TraversalReport {
    pub pages: Vec<PageRecord>,
    /// Fetch outcome per page, index-aligned with `pages`
    pub fetches: Vec<FetchOutcome>,
    pub end: TraversalEnd,
}

impl TraversalReport {
    /// Pages that were written during this traversal
    pub fn saved(&self) -> usize {
        self.fetches
            .iter()
            .filter(|outcome| matches!(outcome, FetchOutcome::Saved { .. }))
            .count()
    }
}

/// Result of one blob fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Destination existed already; nothing requested
    AlreadyPresent,
    /// Written to disk
    Saved { bytes: u64 },
    /// Server answered with something that is not an image; nothing written
    UnexpectedContentType(String),
    /// Network or filesystem failure; nothing written
    Failed(String),
}

/// Result of assembling one instrument document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyOutcome {
    Created { pages: usize },
    AlreadyExists,
    Failed(String),
}

/// Per-instrument results of one assembly pass, sorted by instrument
#[derive(Debug, Clone, Default)]
pub struct AssemblyReport {
    pub documents: Vec<(String, AssemblyOutcome)>,
}

impl AssemblyReport {
    pub fn created(&self) -> usize {
        self.documents
            .iter()
            .filter(|(_, outcome)| matches!(outcome, AssemblyOutcome::Created { .. }))
            .count()
    }
}

/// Everything one session target produced
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub target: PathBuf,
    pub traversal: TraversalReport,
    pub assembly: AssemblyReport,
}

/// Counters shown in the final summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub new: usize,
    pub overwritten: usize,
    pub renamed: usize,
    pub skipped: usize,
    pub errors: usize,
}
