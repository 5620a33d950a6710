use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

/// Tag used when a filename does not follow the part naming convention
pub const UNKNOWN_INSTRUMENT: &str = "unknown-instrument";

/// `_<part>_<letter or All>_`, e.g. `OHolyNight_violin-1_A_001.png`
static INSTRUMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_([a-zA-Z0-9-]+)_(?:[A-Z]|All)_").expect("instrument pattern is valid")
});

/// Trailing page number, e.g. `part_010.png`
static PAGE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)_(\d+)\.png$").expect("page number pattern is valid"));

/// Derive the page filename from an image URL: query string stripped, path basename kept.
///
/// This is the dedup key for pages. Signed URLs for the same page differ only in
/// their query, so they map to the same filename.
pub fn page_filename(url: &str) -> String {
    let path = url.split('?').next().unwrap_or_default();
    match path.rsplit_once('/') {
        Some((_, name)) => name.to_string(),
        None => path.to_string(),
    }
}

/// Extract the instrument tag from a page filename
pub fn instrument_tag(filename: &str) -> String {
    INSTRUMENT_RE
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_INSTRUMENT.to_string())
}

/// Numeric page suffix of a `.png` filename, if it has one
pub fn page_number(filename: &str) -> Option<u64> {
    PAGE_NUMBER_RE
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Page order inside an instrument: numbered pages first by number, then the rest by name
pub fn compare_pages(a: &str, b: &str) -> Ordering {
    match (page_number(a), page_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
