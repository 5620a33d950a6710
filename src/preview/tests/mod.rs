//! Simulated carousel used to drive the traversal without a browser.

mod traversal_tests;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use super::{
    ADVANCE_CONTROL, FIRST_SLOT_IMAGE, LOADING_INDICATOR, PREVIEW_CONTAINER, PageSurface,
    SHEET_WRAPPER, SLOT_IMAGE,
};
use crate::error::{Error, Result};
use crate::fetch::BlobFetcher;
use crate::results::FetchOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimElement {
    Container,
    Slot(usize),
    Image(usize),
    Button(usize),
}

#[derive(Debug, Default)]
struct SimState {
    /// Index of the page shown in slot 1
    current: usize,
    clicks: usize,
    /// `query_all` calls so far; drives delayed rendering
    queries: usize,
    /// Query count at which a pending advance becomes visible
    pending_advance: Option<usize>,
}

/// A two-pane carousel over `pages` that wraps back to the first page
pub struct SimCarousel {
    pages: Vec<String>,
    state: Mutex<SimState>,
    /// Clicks from this one on no longer move the carousel
    pub stall_from_click: Option<usize>,
    /// Slot 2 loses its button once slot 1 shows this page index
    pub no_button_at: Option<usize>,
    /// Number of slot queries after a click before the new page shows up
    pub settle_queries: usize,
    /// After this many clicks only one slot is rendered
    pub collapse_after_clicks: Option<usize>,
    pub spinner_stuck: bool,
    pub container_missing: bool,
    /// Slot 1's image is rendered without a `src`
    pub first_image_blank: bool,
    /// Slot 2's image loses its `src` once slot 1 shows this page index
    pub blank_slot_two_at: Option<usize>,
    /// Host used for page URLs; changes with every lap
    pub cdn: String,
}

impl SimCarousel {
    pub fn new(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            state: Mutex::new(SimState::default()),
            stall_from_click: None,
            no_button_at: None,
            settle_queries: 0,
            collapse_after_clicks: None,
            spinner_stuck: false,
            container_missing: false,
            first_image_blank: false,
            blank_slot_two_at: None,
            cdn: "cdn.example.com".to_string(),
        }
    }

    /// `count` pages named like the site names parts
    pub fn numbered(instrument: &str, count: usize) -> Self {
        let names: Vec<String> = (1..=count)
            .map(|i| format!("Song_{instrument}_A_{i:03}.png"))
            .collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        Self::new(&refs)
    }

    pub fn clicks(&self) -> usize {
        self.state.lock().unwrap().clicks
    }

    /// Rendered URL for absolute position `index`; the query and host change per lap
    fn url_at(&self, index: usize) -> String {
        let lap = index / self.pages.len();
        let name = &self.pages[index % self.pages.len()];
        format!("https://lap{lap}.{}/previews/{name}?sig={lap}", self.cdn)
    }

    fn slot_count(&self, state: &SimState) -> usize {
        if self.pages.is_empty() {
            return 0;
        }
        if let Some(limit) = self.collapse_after_clicks {
            if state.clicks >= limit {
                return 1;
            }
        }
        self.pages.len().min(2)
    }
}

#[async_trait]
impl PageSurface for SimCarousel {
    type Element = SimElement;

    async fn navigate(&self, _url: &str) -> Result<()> {
        Ok(())
    }

    async fn wait_until_visible(&self, selector: &str, _timeout: Duration) -> Result<SimElement> {
        match selector {
            PREVIEW_CONTAINER if !self.container_missing => Ok(SimElement::Container),
            FIRST_SLOT_IMAGE if !self.pages.is_empty() => Ok(SimElement::Image(0)),
            _ => Err(Error::Timeout(format!("'{selector}' to become visible"))),
        }
    }

    async fn wait_until_invisible(&self, selector: &str, _timeout: Duration) -> Result<()> {
        if selector == LOADING_INDICATOR && self.spinner_stuck {
            return Err(Error::Timeout(format!("'{selector}' to disappear")));
        }
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<SimElement>> {
        assert_eq!(selector, SHEET_WRAPPER);
        let mut state = self.state.lock().unwrap();
        state.queries += 1;
        if let Some(at) = state.pending_advance {
            if state.queries >= at {
                state.current += 1;
                state.pending_advance = None;
            }
        }
        Ok((0..self.slot_count(&state)).map(SimElement::Slot).collect())
    }

    async fn find_within(&self, element: &SimElement, selector: &str) -> Result<Option<SimElement>> {
        let SimElement::Slot(slot) = *element else {
            return Err(Error::Surface(format!("{element:?} has no children")));
        };
        let state = self.state.lock().unwrap();
        match selector {
            SLOT_IMAGE => Ok(Some(SimElement::Image(slot))),
            ADVANCE_CONTROL => {
                let page = state.current % self.pages.len();
                if slot == 1 && self.no_button_at == Some(page) {
                    Ok(None)
                } else {
                    Ok(Some(SimElement::Button(slot)))
                }
            }
            _ => Ok(None),
        }
    }

    async fn read_attribute(&self, element: &SimElement, name: &str) -> Result<Option<String>> {
        assert_eq!(name, "src");
        let SimElement::Image(slot) = *element else {
            return Ok(None);
        };
        if slot == 0 && self.first_image_blank {
            return Ok(None);
        }
        let state = self.state.lock().unwrap();
        if slot == 1
            && self
                .blank_slot_two_at
                .is_some_and(|at| at == state.current % self.pages.len())
        {
            return Ok(None);
        }
        Ok(Some(self.url_at(state.current + slot)))
    }

    async fn activate(&self, element: &SimElement) -> Result<()> {
        assert!(matches!(element, SimElement::Button(1)), "only slot 2 advances");
        let mut state = self.state.lock().unwrap();
        state.clicks += 1;
        let stalled = self
            .stall_from_click
            .map(|from| state.clicks >= from)
            .unwrap_or(false);
        if !stalled {
            state.pending_advance = Some(state.queries + 1 + self.settle_queries);
        }
        Ok(())
    }
}

/// Records fetch requests instead of touching the network
#[derive(Default)]
pub struct RecordingFetcher {
    pub requests: Mutex<Vec<(String, PathBuf)>>,
}

impl RecordingFetcher {
    pub fn destinations(&self) -> Vec<PathBuf> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, dest)| dest.clone())
            .collect()
    }
}

#[async_trait]
impl BlobFetcher for RecordingFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> FetchOutcome {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), destination.to_path_buf()));
        FetchOutcome::Saved { bytes: 0 }
    }
}
