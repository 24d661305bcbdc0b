//! Source loading: open the PDF every event reads from.
//!
//! The path is checked before pdfium sees it (existence, read permission,
//! `%PDF` magic) so callers get a precise error instead of an opaque
//! pdfium failure code. Any failure here is fatal for the run.

use crate::error::SplitError;
use crate::pipeline::raster::{self, PageRender};
use pdfium_render::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Anything the split orchestrator can pull rendered pages from.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Rasterise the page at 0-based `index`. Out-of-range indices are
    /// [`PageRender::Missing`], never an error.
    fn render_page(&self, index: usize, dpi_x: u32, dpi_y: u32) -> PageRender;
}

/// Check that `path` exists, is readable, and starts with `%PDF`.
pub fn validate_source(path: &Path) -> Result<(), SplitError> {
    if !path.exists() {
        return Err(SplitError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            match f.read_exact(&mut magic) {
                Ok(()) if &magic == b"%PDF" => Ok(()),
                Ok(()) => Err(SplitError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                }),
                Err(e) => Err(SplitError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail: format!("cannot read header: {e}"),
                }),
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(SplitError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => Err(SplitError::FileNotFound {
            path: path.to_path_buf(),
        }),
    }
}

/// A loaded source document.
pub struct PdfiumSource<'a> {
    document: PdfDocument<'a>,
    path: PathBuf,
}

/// Open `path` with `pdfium`.
pub fn load<'a>(pdfium: &'a Pdfium, path: &Path) -> Result<PdfiumSource<'a>, SplitError> {
    validate_source(path)?;

    let document = pdfium.load_pdf_from_file(path, None).map_err(|e| {
        let detail = format!("{e:?}");
        if detail.contains("Password") || detail.contains("password") {
            SplitError::Encrypted {
                path: path.to_path_buf(),
            }
        } else {
            SplitError::CorruptPdf {
                path: path.to_path_buf(),
                detail,
            }
        }
    })?;

    info!(
        "PDF loaded: {} ({} pages)",
        path.display(),
        document.pages().len()
    );

    Ok(PdfiumSource {
        document,
        path: path.to_path_buf(),
    })
}

impl<'a> PdfiumSource<'a> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The page at 0-based `index`, or `None` when it does not exist.
    pub fn page(&self, index: usize) -> Option<PdfPage<'a>> {
        if index >= self.page_count() {
            return None;
        }
        match self.document.pages().get(index.try_into().ok()?) {
            Ok(page) => Some(page),
            Err(e) => {
                debug!("Page index {} unavailable: {:?}", index, e);
                None
            }
        }
    }
}

impl PageSource for PdfiumSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(&self, index: usize, dpi_x: u32, dpi_y: u32) -> PageRender {
        match self.page(index) {
            None => PageRender::Missing,
            Some(page) => match raster::render(&page, index + 1, dpi_x, dpi_y) {
                Ok(pixels) => PageRender::Rendered(pixels),
                Err(e) => PageRender::Failed(e),
            },
        }
    }
}
