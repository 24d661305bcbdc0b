//! # pdf-eventsplit
//!
//! Split one multi-page PDF into several output PDFs, one per *event*
//! (a 1-indexed page range plus an output file name), by rasterising each
//! page and re-painting it in grayscale on a fresh A4 page.
//!
//! ## Why rasterise instead of copying pages?
//!
//! Copying page objects keeps whatever the source carried: colour images,
//! embedded fonts, annotations, broken content streams. Rendering every page
//! through pdfium and painting the pixels back normalises all of that into
//! a single grayscale image per page on a uniform 595 × 842 pt page, at the
//! cost of selectable text.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Load       validate path + open with pdfium (fatal on failure)
//!  ├─ 2. Render     page → 96 DPI RGB bitmap (row stride kept as-is)
//!  ├─ 3. Grayscale  BT.601 luminance into a packed 8-bit buffer
//!  ├─ 4. Composite  one A4 page per painted buffer, per event output
//!  └─ 5. Report     painted / missing / failed counts per event
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_eventsplit::{split, SplitConfig, SplitEvent};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     std::fs::create_dir_all("out")?;
//!     let events = vec![SplitEvent::new(1, 2, "a.pdf"), SplitEvent::new(3, 3, "b.pdf")];
//!     let report = split("bundle.pdf", "out", &events, &SplitConfig::default())?;
//!     for e in &report.events {
//!         let (painted, requested) = (e.painted_pages, e.requested_pages());
//!         eprintln!("{}: {painted}/{requested} pages", e.output_path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfsplit` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! pdfium itself is loaded at runtime: set `PDFIUM_LIB_PATH` or
//! [`SplitConfig::library_path`] if it is not on the system library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod split;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    PaintMode, SplitConfig, SplitConfigBuilder, OUTPUT_PAGE_HEIGHT_PT, OUTPUT_PAGE_WIDTH_PT,
    RENDER_DPI,
};
pub use error::{BufferLayoutError, PageError, SplitError};
pub use event::{load_events, parse_events_json, CaseEvent, SplitEvent};
pub use output::{EventReport, SplitReport};
pub use pipeline::composite::{Compositor, OutputSurface};
pub use pipeline::grayscale::{to_grayscale, GrayscaleBuffer};
pub use pipeline::load::PageSource;
pub use pipeline::raster::{ChannelOrder, PageRender, PixelBuffer};
pub use progress::{NoopProgressCallback, ProgressCallback, SplitProgressCallback};
pub use split::{split, split_async, split_with, split_with_pdfium};
