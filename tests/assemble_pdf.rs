use std::fs;
use std::path::Path;

use chart_pages::assemble::assemble;
use chart_pages::results::AssemblyOutcome;
use chart_pages::ui::Console;
use image::{Rgb, RgbImage};
use lopdf::Document;

fn write_page(dir: &Path, name: &str, width: u32) {
    fs::create_dir_all(dir).unwrap();
    RgbImage::from_pixel(width, 20, Rgb([250, 250, 250]))
        .save(dir.join(name))
        .unwrap();
}

/// Page widths in document order
fn page_widths(pdf: &Path) -> Vec<i64> {
    let doc = Document::load(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|id| {
            let page = doc.get_object(*id).unwrap().as_dict().unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            media_box[2].as_i64().unwrap()
        })
        .collect()
}

#[test]
fn test_pages_ordered_numerically() {
    let session = tempfile::tempdir().unwrap();
    let cello = session.path().join("cello");
    write_page(&cello, "part_002.png", 20);
    write_page(&cello, "part_001.png", 10);
    write_page(&cello, "part_010.png", 30);

    let report = assemble(&Console::plain(), session.path());

    assert_eq!(
        report.documents,
        vec![("cello".to_string(), AssemblyOutcome::Created { pages: 3 })]
    );
    assert_eq!(page_widths(&session.path().join("cello.pdf")), vec![10, 20, 30]);
}

#[test]
fn test_existing_documents_are_kept() {
    let session = tempfile::tempdir().unwrap();
    write_page(&session.path().join("flute"), "f_001.png", 10);
    fs::write(session.path().join("flute.pdf"), b"previous run").unwrap();

    let report = assemble(&Console::plain(), session.path());

    assert_eq!(
        report.documents,
        vec![("flute".to_string(), AssemblyOutcome::AlreadyExists)]
    );
    assert_eq!(
        fs::read(session.path().join("flute.pdf")).unwrap(),
        b"previous run"
    );
}

#[test]
fn test_broken_instrument_does_not_stop_others() {
    let session = tempfile::tempdir().unwrap();
    let broken = session.path().join("broken");
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join("b_001.png"), b"not really a png").unwrap();
    write_page(&session.path().join("violin-1"), "v_001.png", 12);
    fs::create_dir_all(session.path().join("empty")).unwrap();

    let report = assemble(&Console::plain(), session.path());

    assert_eq!(report.documents.len(), 2);
    assert!(matches!(report.documents[0], (ref name, AssemblyOutcome::Failed(_)) if name == "broken"));
    assert_eq!(
        report.documents[1],
        ("violin-1".to_string(), AssemblyOutcome::Created { pages: 1 })
    );
    assert!(!session.path().join("broken.pdf").exists());
    assert!(!session.path().join("empty.pdf").exists());
    assert_eq!(page_widths(&session.path().join("violin-1.pdf")), vec![12]);
}

#[test]
fn test_second_run_is_idempotent() {
    let session = tempfile::tempdir().unwrap();
    write_page(&session.path().join("piano"), "p_001.png", 10);

    let first = assemble(&Console::plain(), session.path());
    let written = fs::read(session.path().join("piano.pdf")).unwrap();
    let second = assemble(&Console::plain(), session.path());

    assert_eq!(first.created(), 1);
    assert_eq!(second.created(), 0);
    assert_eq!(fs::read(session.path().join("piano.pdf")).unwrap(), written);
}
