//! RGB → single-channel luminance reduction.
//!
//! Weights are the ITU-R BT.601 luma coefficients (0.299, 0.587, 0.114),
//! evaluated in fixed point so that `R == G == B` maps back to exactly the
//! same value. The source is read through its row stride; the destination
//! is always tightly packed (`stride == width`).

use crate::pipeline::raster::PixelBuffer;
use image::GrayImage;

/// A tightly packed `width × height` single-channel raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayscaleBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl GrayscaleBuffer {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes; always equal to `width`.
    pub fn stride(&self) -> usize {
        self.width as usize
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.stride() + x as usize]
    }

    /// Hand the bytes over as an `image` luma raster.
    pub fn into_image(self) -> GrayImage {
        let (w, h) = (self.width, self.height);
        GrayImage::from_raw(w, h, self.data)
            .expect("GrayscaleBuffer holds exactly width * height bytes")
    }
}

/// Perceptual luminance `round(0.299 R + 0.587 G + 0.114 B)`, clamped to 0–255.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let weighted = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
    ((weighted + 500) / 1000).min(255) as u8
}

/// Reduce `pixels` to luminance, consuming the colour buffer.
pub fn to_grayscale(pixels: PixelBuffer) -> GrayscaleBuffer {
    let (width, height) = (pixels.width(), pixels.height());
    let (ri, gi, bi) = pixels.order().rgb_offsets();

    let mut data = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        data.extend(
            pixels
                .row(y)
                .chunks_exact(3)
                .map(|px| luminance(px[ri], px[gi], px[bi])),
        );
    }

    GrayscaleBuffer {
        data,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::raster::ChannelOrder;

    #[test]
    fn luminance_weights() {
        assert_eq!(luminance(0, 0, 0), 0);
        assert_eq!(luminance(255, 255, 255), 255);
        assert_eq!(luminance(255, 0, 0), 76); // 76.245
        assert_eq!(luminance(0, 255, 0), 150); // 149.685
        assert_eq!(luminance(0, 0, 255), 29); // 29.07
    }

    #[test]
    fn gray_input_is_unchanged() {
        for v in 0..=255u8 {
            assert_eq!(luminance(v, v, v), v, "value {v}");
        }
    }

    #[test]
    fn reads_source_stride_writes_packed() {
        // 3x2 image, stride 12 (3 padding bytes per row filled with junk).
        #[rustfmt::skip]
        let data = vec![
            0, 0, 0,   255, 255, 255,   255, 0, 0,   9, 9, 9,
            0, 255, 0, 0, 0, 255,       128, 128, 128, 9, 9, 9,
        ];
        let pixels = PixelBuffer::new(data, 3, 2, 12).unwrap();
        let gray = to_grayscale(pixels);

        assert_eq!(gray.stride(), 3);
        assert_eq!(gray.data(), &[0, 255, 76, 150, 29, 128]);
        assert_eq!(gray.get(2, 1), 128);
    }

    #[test]
    fn honours_bgr_order() {
        let pixels = PixelBuffer::packed(vec![255, 0, 0], 1, 1)
            .unwrap()
            .with_order(ChannelOrder::Bgr);
        // BGR (255, 0, 0) is pure blue.
        assert_eq!(to_grayscale(pixels).data(), &[29]);
    }

    #[test]
    fn into_image_keeps_geometry() {
        let pixels = PixelBuffer::packed(vec![200; 4 * 3 * 3], 4, 3).unwrap();
        let img = to_grayscale(pixels).into_image();
        assert_eq!(img.dimensions(), (4, 3));
        assert!(img.pixels().all(|p| p.0[0] == 200));
    }

    #[test]
    fn into_image_keeps_pixel_order() {
        let rgb: Vec<u8> = (0u8..6).flat_map(|v| [v * 40; 3]).collect();
        let img = to_grayscale(PixelBuffer::packed(rgb, 3, 2).unwrap()).into_image();
        assert_eq!(img.as_raw(), &vec![0, 40, 80, 120, 160, 200]);
        assert_eq!(img.get_pixel(2, 1).0, [200]);
    }
}
