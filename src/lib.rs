//! Downloads sheet music preview pages from a song's preview carousel, sorts
//! them by instrument part and packs each part into a PDF.

pub mod assemble;
pub mod batch;
pub mod config;
pub mod error;
pub mod fetch;
pub mod naming;
pub mod paths;
pub mod preview;
pub mod results;
pub mod session;
pub mod ui;
pub mod urls;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::{Error, Result};
pub use fetch::{BlobFetcher, HttpFetcher};
pub use preview::PageSurface;
pub use results::{FetchOutcome, PageRecord, RunStats, TraversalEnd, TraversalReport};
