//! Pipeline stages for rasterised PDF splitting.
//!
//! Each submodule implements exactly one transformation step, and the two
//! ends of the pipeline sit behind traits ([`load::PageSource`],
//! [`composite::Compositor`]) so the orchestrator can be driven by pdfium
//! or by in-memory fakes.
//!
//! ## Data Flow
//!
//! ```text
//! load ──▶ raster ──▶ grayscale ──▶ composite
//! (pdfium)  (RGB + stride)  (packed luma)  (one page per paint)
//! ```
//!
//! 1. [`load`]      — validate and open the source PDF; fatal on failure
//! 2. [`raster`]    — render one page at 96 × 96 DPI into a [`raster::PixelBuffer`]
//! 3. [`grayscale`] — BT.601 luminance into a packed [`grayscale::GrayscaleBuffer`]
//! 4. [`composite`] — paint onto a fresh 595 × 842 pt page of the event's output

pub mod composite;
pub mod grayscale;
pub mod load;
pub mod raster;
