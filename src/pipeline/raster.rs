//! Page rasterisation: one source page → one 24-bit pixel buffer.
//!
//! pdfium renders into bitmaps whose rows are padded to a 4-byte boundary,
//! so a rendered row is frequently longer than `width * 3`. [`PixelBuffer`]
//! carries that stride explicitly instead of copying rows into a packed
//! layout; the grayscale stage reads through it directly.

use crate::error::{BufferLayoutError, PageError};
use pdfium_render::prelude::*;
use tracing::debug;

/// Byte order of the three colour channels inside a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    #[default]
    Rgb,
    /// pdfium's native 24-bit layout.
    Bgr,
}

impl ChannelOrder {
    /// Offsets of red, green and blue within a 3-byte pixel.
    pub fn rgb_offsets(self) -> (usize, usize, usize) {
        match self {
            ChannelOrder::Rgb => (0, 1, 2),
            ChannelOrder::Bgr => (2, 1, 0),
        }
    }
}

/// A `width × height` 3-channel raster whose rows start `stride` bytes apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
    order: ChannelOrder,
}

impl PixelBuffer {
    /// Wrap RGB bytes laid out with the given row `stride`.
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<Self, BufferLayoutError> {
        if width == 0 || height == 0 {
            return Err(BufferLayoutError::Empty { width, height });
        }
        let row_bytes = width as usize * 3;
        if stride < row_bytes {
            return Err(BufferLayoutError::StrideTooShort { stride, row_bytes });
        }
        // The last row may omit its padding.
        let needed = stride * (height as usize - 1) + row_bytes;
        if data.len() < needed {
            return Err(BufferLayoutError::Truncated {
                len: data.len(),
                needed,
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
            order: ChannelOrder::Rgb,
        })
    }

    /// Wrap tightly packed RGB bytes (`stride == width * 3`).
    pub fn packed(data: Vec<u8>, width: u32, height: u32) -> Result<Self, BufferLayoutError> {
        Self::new(data, width, height, width as usize * 3)
    }

    /// Reinterpret the channel order of the same bytes.
    pub fn with_order(mut self, order: ChannelOrder) -> Self {
        self.order = order;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    /// The `width * 3` meaningful bytes of row `y`, without padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * 3]
    }

    /// Red, green and blue of the pixel at (`x`, `y`).
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let (r, g, b) = self.order.rgb_offsets();
        let px = &self.row(y)[x as usize * 3..x as usize * 3 + 3];
        [px[r], px[g], px[b]]
    }
}

/// Result of asking a source for one page.
#[derive(Debug)]
pub enum PageRender {
    /// The page rasterised successfully.
    Rendered(PixelBuffer),
    /// The source has no such page; skipped silently.
    Missing,
    /// The page exists but could not be rasterised; skipped.
    Failed(PageError),
}

/// Pixel extent of a `points`-long page edge at `dpi`.
pub fn pixels_for(points: f32, dpi: u32) -> u32 {
    ((points * dpi as f32 / 72.0).round() as u32).max(1)
}

/// Rasterise `page` at `dpi_x × dpi_y` with anti-aliased text, paths and
/// images. `page_num` is 1-indexed and only used for error reporting.
pub fn render(
    page: &PdfPage<'_>,
    page_num: usize,
    dpi_x: u32,
    dpi_y: u32,
) -> Result<PixelBuffer, PageError> {
    let failed = |detail: String| PageError::RenderFailed {
        page: page_num,
        detail,
    };

    let target_w = pixels_for(page.width().value, dpi_x);
    let target_h = pixels_for(page.height().value, dpi_y);

    let render_config = PdfRenderConfig::new()
        .set_target_width(target_w as i32)
        .set_target_height(target_h as i32)
        .set_format(PdfBitmapFormat::BGR)
        .set_text_smoothing(true)
        .set_path_smoothing(true)
        .set_image_smoothing(true)
        .use_lcd_text_rendering(false);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| failed(format!("{e:?}")))?;

    let width = u32::try_from(bitmap.width()).map_err(|_| failed("negative bitmap width".into()))?;
    let height =
        u32::try_from(bitmap.height()).map_err(|_| failed("negative bitmap height".into()))?;
    if width == 0 || height == 0 {
        return Err(failed(format!("pdfium produced an empty {width}x{height} bitmap")));
    }

    let data = bitmap.as_raw_bytes();
    let stride = data.len() / height as usize;

    debug!(
        "Rendered page {} → {}x{} px (stride {})",
        page_num, width, height, stride
    );

    PixelBuffer::new(data, width, height, stride)
        .map(|b| b.with_order(ChannelOrder::Bgr))
        .map_err(|e| failed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty() {
        assert_eq!(
            PixelBuffer::new(vec![], 0, 4, 0),
            Err(BufferLayoutError::Empty { width: 0, height: 4 })
        );
    }

    #[test]
    fn rejects_short_stride() {
        let err = PixelBuffer::new(vec![0; 64], 4, 2, 10).unwrap_err();
        assert_eq!(
            err,
            BufferLayoutError::StrideTooShort {
                stride: 10,
                row_bytes: 12
            }
        );
    }

    #[test]
    fn rejects_truncated_data() {
        // two rows of stride 16, last row needs 12 bytes → 28
        let err = PixelBuffer::new(vec![0; 27], 4, 2, 16).unwrap_err();
        assert_eq!(err, BufferLayoutError::Truncated { len: 27, needed: 28 });
        assert!(PixelBuffer::new(vec![0; 28], 4, 2, 16).is_ok());
    }

    #[test]
    fn row_skips_padding() {
        // 2x2, stride 8 (2 padding bytes per row)
        let data = vec![1, 2, 3, 4, 5, 6, 0xEE, 0xEE, 7, 8, 9, 10, 11, 12, 0xEE, 0xEE];
        let buf = PixelBuffer::new(data, 2, 2, 8).unwrap();
        assert_eq!(buf.row(0), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(buf.row(1), &[7, 8, 9, 10, 11, 12]);
        assert_eq!(buf.rgb(1, 1), [10, 11, 12]);
    }

    #[test]
    fn bgr_order_swaps_red_and_blue() {
        let buf = PixelBuffer::packed(vec![10, 20, 30], 1, 1)
            .unwrap()
            .with_order(ChannelOrder::Bgr);
        assert_eq!(buf.rgb(0, 0), [30, 20, 10]);
    }

    #[test]
    fn a4_at_96_dpi() {
        assert_eq!(pixels_for(595.0, 96), 793);
        assert_eq!(pixels_for(842.0, 96), 1123);
        assert_eq!(pixels_for(0.1, 96), 1);
    }
}
