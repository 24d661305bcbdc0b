//! End-to-end tests against a real pdfium library.
//!
//! Source PDFs are generated on the fly, so no fixtures are needed, but a
//! pdfium shared library is: set `PDFIUM_LIB_PATH` or install it on the
//! system library path. Without one every test here prints SKIP and passes.
//!
//! A bound `Pdfium` holds pdfium's process-wide lock until dropped, so each
//! test binds once and passes that instance to `split_with_pdfium`.
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e -- --nocapture

use image::{DynamicImage, Rgb, RgbImage};
use pdf_eventsplit::engine;
use pdf_eventsplit::pipeline::composite::PdfiumCompositor;
use pdf_eventsplit::{
    split, split_async, split_with_pdfium, to_grayscale, Compositor, GrayscaleBuffer,
    OutputSurface, PaintMode, PixelBuffer, SplitConfig, SplitError, SplitEvent,
    OUTPUT_PAGE_HEIGHT_PT, OUTPUT_PAGE_WIDTH_PT,
};
use pdfium_render::prelude::*;
use std::path::Path;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test when no pdfium library can be bound.
macro_rules! pdfium_or_skip {
    () => {{
        match engine::bind(None) {
            Ok(p) => p,
            Err(e) => {
                println!("SKIP — pdfium unavailable: {e}");
                return;
            }
        }
    }};
}

/// Write an A4 PDF with `pages` pages, each carrying a saturated colour block.
fn make_source(pdfium: &Pdfium, path: &Path, pages: usize) {
    let mut doc = pdfium.create_new_pdf().expect("new document");
    for i in 0..pages {
        let mut page = doc
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::a4())
            .expect("new page");
        let block = RgbImage::from_pixel(32, 32, Rgb([220, 20, (i * 50 % 256) as u8]));
        page.objects_mut()
            .create_image_object(
                PdfPoints::new(72.0),
                PdfPoints::new(72.0),
                &DynamicImage::ImageRgb8(block),
                Some(PdfPoints::new(288.0)),
                Some(PdfPoints::new(288.0)),
            )
            .expect("image object");
    }
    doc.save_to_file(path).expect("save source");
}

/// Page count and (width, height) in points of every page of `path`.
fn page_sizes(pdfium: &Pdfium, path: &Path) -> Vec<(f32, f32)> {
    let doc = pdfium
        .load_pdf_from_file(path, None)
        .expect("output must be a loadable PDF");
    doc.pages()
        .iter()
        .map(|p| (p.width().value, p.height().value))
        .collect()
}

/// A solid `w × h` grayscale buffer of `level`.
fn solid_gray(level: u8, w: u32, h: u32) -> GrayscaleBuffer {
    let rgb = vec![level; (w * h * 3) as usize];
    to_grayscale(PixelBuffer::packed(rgb, w, h).expect("packed layout"))
}

fn assert_a4(sizes: &[(f32, f32)], context: &str) {
    for (w, h) in sizes {
        assert!(
            (w - OUTPUT_PAGE_WIDTH_PT).abs() < 0.5 && (h - OUTPUT_PAGE_HEIGHT_PT).abs() < 0.5,
            "[{context}] page is {w}x{h}, expected 595x842"
        );
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn test_five_page_scenario() {
    let pdfium = pdfium_or_skip!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bundle.pdf");
    make_source(&pdfium, &input, 5);

    let out = dir.path().join("out");
    std::fs::create_dir_all(&out).unwrap();
    let events = vec![
        SplitEvent::new(1, 2, "a.pdf"),
        SplitEvent::new(4, 5, "b.pdf"),
        SplitEvent::new(3, 3, "c.pdf"),
    ];

    let report =
        split_with_pdfium(&pdfium, &input, &out, &events, &SplitConfig::default()).expect("split");
    assert_eq!(report.source_pages, 5);

    for (name, expected) in [("a.pdf", 2), ("b.pdf", 2), ("c.pdf", 1)] {
        let sizes = page_sizes(&pdfium, &out.join(name));
        assert_eq!(sizes.len(), expected, "{name}");
        assert_a4(&sizes, name);
    }

    // Files are finalised in listed order.
    let mtime = |n: &str| std::fs::metadata(out.join(n)).unwrap().modified().unwrap();
    assert!(mtime("a.pdf") <= mtime("b.pdf"));
    assert!(mtime("b.pdf") <= mtime("c.pdf"));
}

#[test]
fn test_out_of_range_event_writes_empty_pdf() {
    let pdfium = pdfium_or_skip!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("two.pdf");
    make_source(&pdfium, &input, 2);

    let events = vec![SplitEvent::new(7, 9, "ghost.pdf")];
    let report = split_with_pdfium(&pdfium, &input, dir.path(), &events, &SplitConfig::default())
        .expect("split");

    assert_eq!(report.events[0].painted_pages, 0);
    assert_eq!(report.events[0].missing_pages, 3);
    assert!(page_sizes(&pdfium, &dir.path().join("ghost.pdf")).is_empty());
}

#[test]
fn test_output_is_grayscale() {
    let pdfium = pdfium_or_skip!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("colour.pdf");
    make_source(&pdfium, &input, 1);

    split_with_pdfium(
        &pdfium,
        &input,
        dir.path(),
        &[SplitEvent::new(1, 1, "gray.pdf")],
        &SplitConfig::default(),
    )
    .expect("split");

    let doc = pdfium
        .load_pdf_from_file(&dir.path().join("gray.pdf"), None)
        .unwrap();
    let page = doc.pages().get(0).unwrap();
    let rendered = page
        .render_with_config(&PdfRenderConfig::new().set_target_width(200))
        .unwrap()
        .as_image()
        .to_rgb8();

    let coloured = rendered
        .pixels()
        .filter(|p| {
            let [r, g, b] = p.0;
            r.abs_diff(g) > 8 || g.abs_diff(b) > 8
        })
        .count();
    assert_eq!(coloured, 0, "output must contain only gray pixels");

    // The colour block was painted, so the page is not blank.
    assert!(rendered.pixels().any(|p| p.0[0] < 200));
}

#[test]
fn test_luma_mode_produces_valid_pages() {
    let pdfium = pdfium_or_skip!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("src.pdf");
    make_source(&pdfium, &input, 2);

    let config = SplitConfig::builder()
        .paint_mode(PaintMode::Luma)
        .build()
        .unwrap();
    let events = [SplitEvent::new(1, 2, "luma.pdf")];
    let report =
        split_with_pdfium(&pdfium, &input, dir.path(), &events, &config).expect("split");

    assert_eq!(report.events[0].painted_pages, 2);
    assert_a4(&page_sizes(&pdfium, &dir.path().join("luma.pdf")), "luma");
}

#[test]
fn test_split_binds_its_own_engine() {
    let pdfium = pdfium_or_skip!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("own.pdf");
    make_source(&pdfium, &input, 2);
    // `split` binds again; release ours first.
    drop(pdfium);

    let report = split(
        &input,
        dir.path(),
        &[SplitEvent::new(1, 2, "own_out.pdf")],
        &SplitConfig::default(),
    )
    .expect("split");
    assert_eq!(report.events[0].painted_pages, 2);
}

#[test]
fn test_surface_page_count_equals_paints() {
    let pdfium = pdfium_or_skip!();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paints.pdf");

    let compositor = PdfiumCompositor::new(&pdfium, PaintMode::default());
    let mut surface = compositor.open(&path).expect("open");
    surface.paint(solid_gray(0, 40, 30), 1).expect("paint 1");
    surface.paint(solid_gray(128, 40, 30), 2).expect("paint 2");
    assert_eq!(surface.finalize().expect("finalize"), 2);

    let sizes = page_sizes(&pdfium, &path);
    assert_eq!(sizes.len(), 2);
    assert_a4(&sizes, "paints");
}

#[test]
fn test_dropped_surface_still_writes_pdf() {
    let pdfium = pdfium_or_skip!();
    let dir = tempfile::tempdir().unwrap();
    let compositor = PdfiumCompositor::new(&pdfium, PaintMode::default());

    let empty = dir.path().join("empty.pdf");
    let surface = compositor.open(&empty).expect("open");
    drop(surface);
    assert!(page_sizes(&pdfium, &empty).is_empty());

    let one = dir.path().join("one.pdf");
    let mut surface = compositor.open(&one).expect("open");
    surface.paint(solid_gray(60, 16, 16), 1).expect("paint");
    drop(surface);
    assert_eq!(page_sizes(&pdfium, &one).len(), 1);
}

#[test]
fn test_open_in_missing_directory_fails() {
    let pdfium = pdfium_or_skip!();
    let dir = tempfile::tempdir().unwrap();
    let compositor = PdfiumCompositor::new(&pdfium, PaintMode::default());

    let err = compositor
        .open(&dir.path().join("absent").join("x.pdf"))
        .err()
        .expect("open must fail without a parent directory");
    assert!(matches!(err, SplitError::OutputCreateFailed { .. }), "got {err:?}");
}

#[cfg(unix)]
#[test]
fn test_open_in_read_only_directory_fails() {
    use std::os::unix::fs::PermissionsExt;

    let pdfium = pdfium_or_skip!();
    let dir = tempfile::tempdir().unwrap();
    let locked = dir.path().join("locked");
    std::fs::create_dir(&locked).unwrap();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

    // Privileged users ignore directory permissions.
    if std::fs::File::create(locked.join("write_check")).is_ok() {
        println!("SKIP — directory permissions not enforced for this user");
        return;
    }

    let compositor = PdfiumCompositor::new(&pdfium, PaintMode::default());
    let err = compositor
        .open(&locked.join("x.pdf"))
        .err()
        .expect("open must fail in a read-only directory");
    assert!(matches!(err, SplitError::OutputCreateFailed { .. }), "got {err:?}");

    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn test_not_a_pdf_is_load_error() {
    let pdfium = pdfium_or_skip!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.pdf");
    std::fs::write(&input, b"hello, not a pdf").unwrap();
    let out = dir.path().join("out");
    std::fs::create_dir_all(&out).unwrap();

    let err = split_with_pdfium(
        &pdfium,
        &input,
        &out,
        &[SplitEvent::new(1, 1, "a.pdf")],
        &SplitConfig::default(),
    )
    .unwrap_err();
    assert!(err.is_load_error(), "got {err:?}");
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
}

#[test]
fn test_corrupt_pdf_is_load_error() {
    let pdfium = pdfium_or_skip!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.pdf");
    std::fs::write(&input, b"%PDF-1.7\nthis is not a real body\n").unwrap();

    let err = split_with_pdfium(
        &pdfium,
        &input,
        dir.path(),
        &[SplitEvent::new(1, 1, "a.pdf")],
        &SplitConfig::default(),
    )
    .unwrap_err();
    assert!(err.is_load_error(), "got {err:?}");
    assert!(!dir.path().join("a.pdf").exists());
}

#[tokio::test]
async fn test_split_async() {
    let pdfium = pdfium_or_skip!();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("async.pdf");
    make_source(&pdfium, &input, 3);
    drop(pdfium);

    let report = split_async(
        input,
        dir.path().to_path_buf(),
        vec![SplitEvent::new(2, 3, "tail.pdf")],
        SplitConfig::default(),
    )
    .await
    .expect("split_async");

    assert_eq!(report.events[0].painted_pages, 2);
    assert!(dir.path().join("tail.pdf").exists());
}
