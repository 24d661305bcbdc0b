//! Error types for the pdf-eventsplit library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`SplitError`] — **Fatal**: the run cannot proceed at all (source PDF
//!   missing or corrupt, PDFium not bindable, malformed event list). Returned
//!   as `Err(SplitError)` from [`crate::split()`] before any event runs.
//!
//! * [`PageError`] — **Non-fatal**: a single page could not be rendered or
//!   painted. The page is skipped, the event's output still gets finalised,
//!   and the error is recorded in [`crate::output::EventReport`].
//!
//! Event-level failures (an output file that cannot be created or written)
//! are also recorded rather than propagated: one event never aborts another.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf-eventsplit library.
#[derive(Debug, Error)]
pub enum SplitError {
    // ── Load errors ───────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF is encrypted; password-protected sources are not supported.
    #[error("PDF '{path}' is encrypted and cannot be split")]
    Encrypted { path: PathBuf },

    // ── Input errors ──────────────────────────────────────────────────────
    /// An event violates `1 <= start_page <= end_page` or names an unusable output.
    #[error("Invalid event #{index}: {reason}")]
    InvalidEvent { index: usize, reason: String },

    /// An events file could not be read or parsed.
    #[error("Failed to read events from '{path}': {detail}")]
    EventsFile { path: PathBuf, detail: String },

    // ── Output errors (recorded per event, never fatal for the run) ──────
    /// Could not create the output file for an event.
    #[error("Failed to create output '{path}': {source}")]
    OutputCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not serialise the finished document into its output file.
    #[error("Failed to write output '{path}': {detail}")]
    OutputWriteFailed { path: PathBuf, detail: String },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib) to point at a\n\
pdfium build, e.g. from https://github.com/bblanchon/pdfium-binaries.\n"
    )]
    EngineUnavailable(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SplitError {
    /// `true` for the failures that mean "the source document could not be
    /// loaded", i.e. the LoadError class that aborts a run before any output.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            SplitError::FileNotFound { .. }
                | SplitError::PermissionDenied { .. }
                | SplitError::NotAPdf { .. }
                | SplitError::CorruptPdf { .. }
                | SplitError::Encrypted { .. }
        )
    }
}

/// A non-fatal error for a single page.
///
/// Stored in [`crate::output::EventReport::page_errors`]; the page is
/// skipped and the event continues with the next page.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Page rasterisation failed.
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// The rendered pixels could not be turned into an output image layer.
    #[error("Page {page}: surface creation failed: {detail}")]
    SurfaceFailed { page: usize, detail: String },
}

/// A pixel buffer whose `{data, width, height, stride}` do not describe a
/// valid image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferLayoutError {
    #[error("buffer has zero size ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("stride {stride} is shorter than a row of {row_bytes} bytes")]
    StrideTooShort { stride: usize, row_bytes: usize },

    #[error("buffer holds {len} bytes but the layout needs {needed}")]
    Truncated { len: usize, needed: usize },
}

impl PageError {
    /// 1-indexed source page the error refers to.
    pub fn page(&self) -> usize {
        match self {
            PageError::RenderFailed { page, .. } | PageError::SurfaceFailed { page, .. } => *page,
        }
    }
}
