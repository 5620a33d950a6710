//! Packs downloaded page images into one PDF per instrument.

use image::ExtendedColorType;
use image::ImageEncoder;
use image::codecs::jpeg::JpegEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::naming;
use crate::results::{AssemblyOutcome, AssemblyReport};
use crate::ui::Console;

const JPEG_QUALITY: u8 = 90;

/// Build `<session>/<instrument>.pdf` for every instrument directory in `session_dir`.
///
/// Instruments whose document already exists are left alone. A failing
/// instrument is reported and does not stop the others.
pub fn assemble(console: &Console, session_dir: &Path) -> AssemblyReport {
    let mut report = AssemblyReport::default();
    if !session_dir.is_dir() {
        console.warning(&format!(
            "Arrangement path is not a directory or does not exist: {}",
            session_dir.display()
        ));
        return report;
    }
    console.header(&format!("Creating PDFs for {}", session_dir.display()));

    let instruments = match instrument_dirs(session_dir) {
        Ok(dirs) => dirs,
        Err(e) => {
            console.error(&format!(
                "Failed to list directory {}: {}",
                session_dir.display(),
                e
            ));
            return report;
        }
    };

    for (instrument, dir) in instruments {
        let pages = match page_images(&dir) {
            Ok(pages) => pages,
            Err(e) => {
                console.error(&format!("Failed to list images in {}: {}", dir.display(), e));
                report
                    .documents
                    .push((instrument, AssemblyOutcome::Failed(e.to_string())));
                continue;
            }
        };
        if pages.is_empty() {
            ::log::debug!("No pages for {}", instrument);
            continue;
        }

        let pdf_path = session_dir.join(format!("{instrument}.pdf"));
        if pdf_path.exists() {
            ::log::debug!("{} already exists", pdf_path.display());
            report
                .documents
                .push((instrument, AssemblyOutcome::AlreadyExists));
            continue;
        }

        let outcome = match write_pdf(&pages, &pdf_path) {
            Ok(()) => {
                console.success(&format!("Created {instrument}.pdf"));
                AssemblyOutcome::Created { pages: pages.len() }
            }
            Err(e) => {
                console.error(&format!("Failed to create PDF for {instrument}: {e}"));
                let _ = fs::remove_file(&pdf_path);
                AssemblyOutcome::Failed(e.to_string())
            }
        };
        report.documents.push((instrument, outcome));
    }

    report
}

/// Instrument subdirectories, sorted by name
fn instrument_dirs(session_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(session_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push((entry.file_name().to_string_lossy().to_string(), entry.path()));
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// PNG pages of one instrument in page order
pub fn page_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if entry.file_type()?.is_file() && name.to_ascii_lowercase().ends_with(".png") {
            names.push(name);
        }
    }
    names.sort_by(|a, b| naming::compare_pages(a, b));
    Ok(names.into_iter().map(|name| dir.join(name)).collect())
}

/// Write `pages` as a PDF with one page per image at 72 dpi
pub fn write_pdf(pages: &[PathBuf], output: &Path) -> Result<()> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(pages.len());
    for path in pages {
        kids.push(Object::Reference(add_page(&mut doc, pages_id, path)?));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(output)?;
    Ok(())
}

fn add_page(doc: &mut Document, pages_id: ObjectId, path: &Path) -> Result<ObjectId> {
    let rgb = image::open(path)?.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).write_image(
        rgb.as_raw(),
        width,
        height,
        ExtendedColorType::Rgb8,
    )?;

    let (w, h) = (i64::from(width), i64::from(height));
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => w,
            "Height" => h,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    ));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![w.into(), 0.into(), 0.into(), h.into(), 0.into(), 0.into()],
            ),
            Operation::new("Do", vec![Object::Name(b"Page".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), w.into(), h.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Page" => image_id,
            },
        },
    }))
}
