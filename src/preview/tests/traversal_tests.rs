use std::path::Path;
use std::time::Duration;

use super::{RecordingFetcher, SimCarousel};
use crate::error::Error;
use crate::preview::traversal::{TraversalOptions, open_preview, traverse};
use crate::results::TraversalEnd;

fn options() -> TraversalOptions {
    TraversalOptions {
        element_wait: Duration::from_millis(200),
        page_change_wait: Duration::from_millis(50),
        poll_interval: Duration::from_millis(5),
    }
}

fn filenames(report: &crate::results::TraversalReport) -> Vec<String> {
    report.pages.iter().map(|p| p.filename.clone()).collect()
}

#[tokio::test]
async fn test_cycle_emits_each_page_once() {
    for count in 2..=6 {
        let carousel = SimCarousel::numbered("violin-1", count);
        let fetcher = RecordingFetcher::default();

        let report = traverse(&carousel, &fetcher, Path::new("out"), &options())
            .await
            .unwrap();

        assert_eq!(report.end, TraversalEnd::CycleComplete, "{count} pages");
        assert_eq!(report.pages.len(), count);
        assert_eq!(fetcher.destinations().len(), count);
        assert_eq!(carousel.clicks(), count - 1);

        let expected: Vec<String> = (1..=count)
            .map(|i| format!("Song_violin-1_A_{i:03}.png"))
            .collect();
        assert_eq!(filenames(&report), expected);
    }
}

#[tokio::test]
async fn test_single_page_preview() {
    let carousel = SimCarousel::numbered("cello", 1);
    let fetcher = RecordingFetcher::default();

    let report = traverse(&carousel, &fetcher, Path::new("out"), &options())
        .await
        .unwrap();

    assert_eq!(report.end, TraversalEnd::SinglePage);
    assert_eq!(report.pages.len(), 1);
    assert_eq!(
        fetcher.destinations(),
        vec![Path::new("out").join("cello").join("Song_cello_A_001.png")]
    );
    assert_eq!(carousel.clicks(), 0);
}

#[tokio::test]
async fn test_anchor_matched_by_filename_not_url() {
    let carousel = SimCarousel::numbered("flute", 3);
    let fetcher = RecordingFetcher::default();

    let report = traverse(&carousel, &fetcher, Path::new("out"), &options())
        .await
        .unwrap();

    // The anchor comes back from a different host with a different signature
    assert_eq!(report.end, TraversalEnd::CycleComplete);
    let urls: Vec<String> = fetcher
        .requests
        .lock()
        .unwrap()
        .iter()
        .map(|(url, _)| url.clone())
        .collect();
    assert_eq!(urls.len(), 3);
    assert!(urls.iter().all(|url| url.contains("lap0.")));
}

#[tokio::test]
async fn test_stalled_advance_ends_without_extra_page() {
    let mut carousel = SimCarousel::numbered("viola", 5);
    carousel.stall_from_click = Some(2);
    let fetcher = RecordingFetcher::default();

    let report = traverse(&carousel, &fetcher, Path::new("out"), &options())
        .await
        .unwrap();

    assert_eq!(report.end, TraversalEnd::AdvanceTimedOut);
    assert_eq!(
        filenames(&report),
        vec![
            "Song_viola_A_001.png",
            "Song_viola_A_002.png",
            "Song_viola_A_003.png"
        ]
    );
    assert_eq!(carousel.clicks(), 2);
}

#[tokio::test]
async fn test_slow_render_is_waited_for() {
    let mut carousel = SimCarousel::numbered("bass", 4);
    carousel.settle_queries = 3;
    let fetcher = RecordingFetcher::default();

    let report = traverse(&carousel, &fetcher, Path::new("out"), &options())
        .await
        .unwrap();

    assert_eq!(report.end, TraversalEnd::CycleComplete);
    assert_eq!(report.pages.len(), 4);
}

#[tokio::test]
async fn test_missing_advance_control_ends_walk() {
    let mut carousel = SimCarousel::numbered("horn", 5);
    carousel.no_button_at = Some(1);
    let fetcher = RecordingFetcher::default();

    let report = traverse(&carousel, &fetcher, Path::new("out"), &options())
        .await
        .unwrap();

    assert_eq!(report.end, TraversalEnd::NoAdvanceControl);
    // Page 3 was in slot 2 when its button went missing; it is still kept
    assert_eq!(report.pages.len(), 3);
    assert_eq!(carousel.clicks(), 1);
}

#[tokio::test]
async fn test_collapse_during_advance_is_graceful() {
    let mut carousel = SimCarousel::numbered("oboe", 5);
    carousel.collapse_after_clicks = Some(2);
    let fetcher = RecordingFetcher::default();

    let report = traverse(&carousel, &fetcher, Path::new("out"), &options())
        .await
        .unwrap();

    assert!(matches!(report.end, TraversalEnd::SurfaceFailure(_)));
    assert_eq!(report.pages.len(), 3);
}

#[tokio::test]
async fn test_missing_first_page_is_fatal() {
    let carousel = SimCarousel::new(&[]);
    let fetcher = RecordingFetcher::default();

    let err = traverse(&carousel, &fetcher, Path::new("out"), &options())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoInitialContent));
    assert!(fetcher.destinations().is_empty());
}

#[tokio::test]
async fn test_blank_first_image_is_fatal() {
    let mut carousel = SimCarousel::numbered("drums", 3);
    carousel.first_image_blank = true;
    let fetcher = RecordingFetcher::default();

    let err = traverse(&carousel, &fetcher, Path::new("out"), &options())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoInitialContent));
    assert!(fetcher.destinations().is_empty());
}

#[tokio::test]
async fn test_blank_second_slot_ends_walk() {
    let mut carousel = SimCarousel::numbered("trumpet", 5);
    carousel.blank_slot_two_at = Some(2);
    let fetcher = RecordingFetcher::default();

    let report = traverse(&carousel, &fetcher, Path::new("out"), &options())
        .await
        .unwrap();

    assert_eq!(report.end, TraversalEnd::SlotImageMissing);
    assert_eq!(
        filenames(&report),
        vec![
            "Song_trumpet_A_001.png",
            "Song_trumpet_A_002.png",
            "Song_trumpet_A_003.png"
        ]
    );
    assert_eq!(fetcher.destinations().len(), 3);
    assert_eq!(carousel.clicks(), 2);
}

#[tokio::test]
async fn test_source_without_filename_ends_walk() {
    let carousel = SimCarousel::new(&["Song_alto-sax_A_001.png", ""]);
    let fetcher = RecordingFetcher::default();

    let report = traverse(&carousel, &fetcher, Path::new("out"), &options())
        .await
        .unwrap();

    assert_eq!(report.end, TraversalEnd::SlotImageMissing);
    assert_eq!(filenames(&report), vec!["Song_alto-sax_A_001.png"]);
    assert_eq!(
        fetcher.destinations(),
        vec![Path::new("out").join("alto-sax").join("Song_alto-sax_A_001.png")]
    );
    assert_eq!(carousel.clicks(), 0);
}

#[tokio::test]
async fn test_first_source_without_filename_is_fatal() {
    let carousel = SimCarousel::new(&["", "Song_alto-sax_A_002.png"]);
    let fetcher = RecordingFetcher::default();

    let err = traverse(&carousel, &fetcher, Path::new("out"), &options())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoInitialContent));
    assert!(fetcher.destinations().is_empty());
}

#[tokio::test]
async fn test_pages_grouped_by_instrument() {
    let carousel = SimCarousel::new(&[
        "Song_violin-1_A_001.png",
        "Song_violin-1_A_002.png",
        "Song_cello_A_001.png",
        "cover.png",
    ]);
    let fetcher = RecordingFetcher::default();

    traverse(&carousel, &fetcher, Path::new("out"), &options())
        .await
        .unwrap();

    let out = Path::new("out");
    assert_eq!(
        fetcher.destinations(),
        vec![
            out.join("violin-1").join("Song_violin-1_A_001.png"),
            out.join("violin-1").join("Song_violin-1_A_002.png"),
            out.join("cello").join("Song_cello_A_001.png"),
            out.join("unknown-instrument").join("cover.png"),
        ]
    );
}

#[tokio::test]
async fn test_open_preview_tolerates_stuck_spinner() {
    let mut carousel = SimCarousel::numbered("piano", 2);
    carousel.spinner_stuck = true;

    open_preview(&carousel, "https://example.com/song", &options())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_open_preview_requires_container() {
    let mut carousel = SimCarousel::numbered("piano", 2);
    carousel.container_missing = true;

    let err = open_preview(&carousel, "https://example.com/song", &options())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));
}
