//! The sheet preview carousel as seen through a browser.
//!
//! [`PageSurface`] is the small set of page-automation commands the traversal
//! needs. [`webdriver::WebDriverSurface`] drives a real browser through
//! WebDriver; tests substitute a simulated carousel.

pub mod traversal;
pub mod webdriver;

#[cfg(test)]
pub(crate) mod tests;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Element that hosts the sheet preview
pub const PREVIEW_CONTAINER: &str = "app-product-sheet-preview";

/// One pane of the two-pane sliding carousel
pub const SHEET_WRAPPER: &str = ".sheet-wrapper";

/// Image of the first pane, waited on before traversal starts
pub const FIRST_SLOT_IMAGE: &str = ".sheet-wrapper:nth-child(1) img";

/// Loading indicators the site shows while the preview renders
pub const LOADING_INDICATOR: &str = ".spinner, .loading, .overlay, .app-spinner";

/// Page image inside a pane
pub const SLOT_IMAGE: &str = "img";

/// Advance control inside a pane
pub const ADVANCE_CONTROL: &str = "button";

/// Page automation commands used by the traversal.
///
/// Lookups that find nothing return `Ok(None)` / an empty list; `Err` is kept
/// for failed commands (lost session, script errors, timeouts).
#[async_trait]
pub trait PageSurface: Send + Sync {
    type Element: Send + Sync;

    /// Load a URL in the browser
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Wait until an element matching `selector` is displayed and return it
    async fn wait_until_visible(&self, selector: &str, timeout: Duration)
    -> Result<Self::Element>;

    /// Wait until no element matching `selector` is displayed
    async fn wait_until_invisible(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// All elements matching `selector`, in document order
    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

    /// First descendant of `element` matching `selector`
    async fn find_within(
        &self,
        element: &Self::Element,
        selector: &str,
    ) -> Result<Option<Self::Element>>;

    /// Attribute value, `None` when the attribute is absent
    async fn read_attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    /// Click an element, even when it is outside the interactable viewport
    async fn activate(&self, element: &Self::Element) -> Result<()>;
}
