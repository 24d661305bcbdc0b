//! Binding to the PDFium engine that loads, rasterises and writes PDFs.
//!
//! Resolution order (first match wins):
//!
//! 1. an explicit path from [`crate::SplitConfig::library_path`];
//! 2. the `PDFIUM_LIB_PATH` environment variable;
//! 3. the system library search path.
//!
//! Paths may name the library file itself or the directory containing it.
//! A failed bind is fatal: nothing can be split without the engine.
//!
//! With pdfium-render's `thread_safe` feature a bound [`Pdfium`] holds a
//! process-wide lock until it is dropped. Binding again on the same thread
//! while one is alive never returns; bind once and share the instance
//! (see [`crate::split_with_pdfium`]).

use crate::error::SplitError;
use pdfium_render::prelude::Pdfium;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an existing pdfium library (file or directory).
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Turn a user-supplied file-or-directory path into the library file path.
pub fn resolve_library_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        let dir = format!("{}{}", path.display(), std::path::MAIN_SEPARATOR);
        PathBuf::from(Pdfium::pdfium_platform_library_name_at_path(dir.as_str()))
    } else {
        path.to_path_buf()
    }
}

/// Bind to pdfium, preferring `library_path`, then `PDFIUM_LIB_PATH`, then
/// the system library.
pub fn bind(library_path: Option<&Path>) -> Result<Pdfium, SplitError> {
    let explicit = library_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(PDFIUM_LIB_PATH_ENV).map(PathBuf::from));

    match explicit {
        Some(p) => bind_from_path(&resolve_library_path(&p)),
        None => {
            debug!("Binding to system pdfium library");
            Pdfium::bind_to_system_library()
                .map(Pdfium::new)
                .map_err(|e| SplitError::EngineUnavailable(format!("system library: {e}")))
        }
    }
}

/// Bind to a pdfium library at an explicit file `path`.
pub fn bind_from_path(path: &Path) -> Result<Pdfium, SplitError> {
    debug!("Binding to pdfium at {}", path.display());
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| SplitError::EngineUnavailable(format!("'{}': {e}", path.display())))
}
