//! Configuration types for event-based PDF splitting.
//!
//! All run behaviour is controlled through [`SplitConfig`], built via its
//! [`SplitConfigBuilder`]. Rendering resolution and output page size are
//! deliberately *not* knobs: every page is rasterised at [`RENDER_DPI`] and
//! painted onto a [`OUTPUT_PAGE_WIDTH_PT`] × [`OUTPUT_PAGE_HEIGHT_PT`] page.

use crate::error::SplitError;
use crate::progress::SplitProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Horizontal and vertical rasterisation resolution, in dots per inch.
pub const RENDER_DPI: u32 = 96;

/// Output page width in PDF points (ISO A4 at 72 dpi).
pub const OUTPUT_PAGE_WIDTH_PT: f32 = 595.0;

/// Output page height in PDF points (ISO A4 at 72 dpi).
pub const OUTPUT_PAGE_HEIGHT_PT: f32 = 842.0;

/// Configuration for a split run.
///
/// # Example
/// ```rust
/// use pdf_eventsplit::{PaintMode, SplitConfig};
///
/// let config = SplitConfig::builder()
///     .paint_mode(PaintMode::Luma)
///     .build()
///     .unwrap();
/// assert_eq!(config.paint_mode, PaintMode::Luma);
/// ```
#[derive(Clone, Default)]
pub struct SplitConfig {
    /// How grayscale pixels are laid onto the output page. Default: [`PaintMode::AlphaMask`].
    pub paint_mode: PaintMode,

    /// Explicit pdfium library (file or directory). If None, `PDFIUM_LIB_PATH`
    /// is consulted, then the system library.
    pub library_path: Option<PathBuf>,

    /// Optional progress observer. If None, the run is silent apart from
    /// `tracing` logs.
    pub progress_callback: Option<Arc<dyn SplitProgressCallback>>,
}

impl fmt::Debug for SplitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitConfig")
            .field("paint_mode", &self.paint_mode)
            .field("library_path", &self.library_path)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn SplitProgressCallback>"),
            )
            .finish()
    }
}

impl SplitConfig {
    /// Create a new builder for `SplitConfig`.
    pub fn builder() -> SplitConfigBuilder {
        SplitConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SplitConfig`].
#[derive(Debug)]
pub struct SplitConfigBuilder {
    config: SplitConfig,
}

impl SplitConfigBuilder {
    pub fn paint_mode(mut self, mode: PaintMode) -> Self {
        self.config.paint_mode = mode;
        self
    }

    pub fn library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.library_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn SplitProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SplitConfig, SplitError> {
        if let Some(ref p) = self.config.library_path {
            if p.as_os_str().is_empty() {
                return Err(SplitError::EngineUnavailable(
                    "pdfium library path is empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How a grayscale buffer is composited onto its output page.
///
/// Both modes paint "source over destination" at the page's top-left corner
/// on a white page; they differ in how the single 8-bit channel is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaintMode {
    /// The channel is an 8-bit alpha mask of black ink: 0 leaves the page
    /// untouched, 255 is fully opaque black. (default)
    #[default]
    AlphaMask,
    /// The channel is luminance: 0 is black, 255 is white.
    Luma,
}

impl std::str::FromStr for PaintMode {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "luma" | "gray" | "grey" => Ok(PaintMode::Luma),
            "alpha" | "alpha_mask" | "alpha-mask" => Ok(PaintMode::AlphaMask),
            other => Err(SplitError::Internal(format!(
                "unknown paint mode '{other}' (expected luma or alpha)"
            ))),
        }
    }
}
