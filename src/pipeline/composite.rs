//! Output composition: grayscale rasters → pages of a new PDF.
//!
//! One [`OutputSurface`] exists per event. Every successful
//! [`OutputSurface::paint`] appends exactly one 595 × 842 pt page holding
//! the raster at its top-left corner, so output page order is paint order.
//! [`OutputSurface::finalize`] consumes the surface and writes the
//! document; it works with zero pages too and yields an empty PDF.
//!
//! The destination file is created when the surface is opened. If a
//! surface is dropped without being finalised (early return, panic) its
//! `Drop` impl still writes the document so the file is never left as a
//! zero-byte stub.

use crate::config::{PaintMode, OUTPUT_PAGE_HEIGHT_PT, OUTPUT_PAGE_WIDTH_PT, RENDER_DPI};
use crate::error::{PageError, SplitError};
use crate::pipeline::grayscale::GrayscaleBuffer;
use image::{DynamicImage, GrayAlphaImage, LumaA};
use pdfium_render::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Creates one output surface per event.
pub trait Compositor {
    type Surface: OutputSurface;

    /// Create the destination file at `output_path` and an empty document
    /// for it. Parent directories must already exist.
    fn open(&self, output_path: &Path) -> Result<Self::Surface, SplitError>;
}

/// An open output document.
pub trait OutputSurface {
    /// Append one page showing `gray`. The buffer is not retained.
    ///
    /// `page_num` is the 1-indexed source page, used for error reporting.
    /// On error no page is added.
    fn paint(&mut self, gray: GrayscaleBuffer, page_num: usize) -> Result<(), PageError>;

    /// Write the document and release the surface. Returns the number of
    /// pages written.
    fn finalize(self) -> Result<usize, SplitError>;
}

/// Build the image layer for `gray` according to `mode`.
pub fn layer_image(gray: GrayscaleBuffer, mode: PaintMode) -> DynamicImage {
    match mode {
        PaintMode::Luma => DynamicImage::ImageLuma8(gray.into_image()),
        PaintMode::AlphaMask => {
            let (w, h) = (gray.width(), gray.height());
            let data = gray.data();
            let stride = gray.stride();
            let layer = GrayAlphaImage::from_fn(w, h, |x, y| {
                LumaA([0, data[y as usize * stride + x as usize]])
            });
            DynamicImage::ImageLumaA8(layer)
        }
    }
}

/// Physical size, in points, of a `px`-long raster edge rendered at `dpi`.
pub fn points_for(px: u32, dpi: u32) -> f32 {
    px as f32 * 72.0 / dpi as f32
}

/// pdfium-backed [`Compositor`].
pub struct PdfiumCompositor<'a> {
    pdfium: &'a Pdfium,
    mode: PaintMode,
}

impl<'a> PdfiumCompositor<'a> {
    pub fn new(pdfium: &'a Pdfium, mode: PaintMode) -> Self {
        Self { pdfium, mode }
    }
}

impl<'a> Compositor for PdfiumCompositor<'a> {
    type Surface = PdfiumSurface<'a>;

    fn open(&self, output_path: &Path) -> Result<PdfiumSurface<'a>, SplitError> {
        let file = File::create(output_path).map_err(|e| SplitError::OutputCreateFailed {
            path: output_path.to_path_buf(),
            source: e,
        })?;

        let document = self
            .pdfium
            .create_new_pdf()
            .map_err(|e| SplitError::OutputWriteFailed {
                path: output_path.to_path_buf(),
                detail: format!("create document: {e:?}"),
            })?;

        debug!("Opened output {}", output_path.display());

        Ok(PdfiumSurface {
            document: Some(document),
            file: Some(file),
            path: output_path.to_path_buf(),
            mode: self.mode,
            pages: 0,
        })
    }
}

/// A new PDF document bound to its destination file.
pub struct PdfiumSurface<'a> {
    document: Option<PdfDocument<'a>>,
    file: Option<File>,
    path: PathBuf,
    mode: PaintMode,
    pages: usize,
}

impl PdfiumSurface<'_> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialise the document into the file, once. Later calls are no-ops.
    fn write_out(&mut self) -> Result<usize, SplitError> {
        let (Some(document), Some(mut file)) = (self.document.take(), self.file.take()) else {
            return Ok(self.pages);
        };

        let write_failed = |detail: String| SplitError::OutputWriteFailed {
            path: self.path.clone(),
            detail,
        };

        let bytes = document
            .save_to_bytes()
            .map_err(|e| write_failed(format!("{e:?}")))?;
        file.write_all(&bytes)
            .and_then(|()| file.flush())
            .map_err(|e| write_failed(e.to_string()))?;

        debug!("Finalised {} ({} pages)", self.path.display(), self.pages);
        Ok(self.pages)
    }
}

impl OutputSurface for PdfiumSurface<'_> {
    fn paint(&mut self, gray: GrayscaleBuffer, page_num: usize) -> Result<(), PageError> {
        let failed = |detail: String| PageError::SurfaceFailed {
            page: page_num,
            detail,
        };

        let document = self
            .document
            .as_mut()
            .ok_or_else(|| failed("surface already finalised".into()))?;

        let width_pt = points_for(gray.width(), RENDER_DPI);
        let height_pt = points_for(gray.height(), RENDER_DPI);
        let image = layer_image(gray, self.mode);

        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(
                PdfPoints::new(OUTPUT_PAGE_WIDTH_PT),
                PdfPoints::new(OUTPUT_PAGE_HEIGHT_PT),
            ))
            .map_err(|e| failed(format!("create page: {e:?}")))?;

        // PDF y grows upwards; anchor the raster's top edge to the page top.
        let placed = page.objects_mut().create_image_object(
            PdfPoints::new(0.0),
            PdfPoints::new(OUTPUT_PAGE_HEIGHT_PT - height_pt),
            &image,
            Some(PdfPoints::new(width_pt)),
            Some(PdfPoints::new(height_pt)),
        );

        if let Err(e) = placed {
            if let Err(del) = page.delete() {
                warn!("Could not remove empty page for source page {page_num}: {del:?}");
            }
            return Err(failed(format!("image object: {e:?}")));
        }

        self.pages += 1;
        Ok(())
    }

    fn finalize(mut self) -> Result<usize, SplitError> {
        self.write_out()
    }
}

impl Drop for PdfiumSurface<'_> {
    fn drop(&mut self) {
        if self.document.is_some() {
            warn!(
                "Output {} dropped without finalize; writing it now",
                self.path.display()
            );
            if let Err(e) = self.write_out() {
                warn!("{e}");
            }
        }
    }
}
