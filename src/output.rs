//! Run results: what each event actually produced.
//!
//! A split run is silent by default. Missing pages and pages that fail to
//! render are skipped, and an event whose file cannot be written does not
//! stop the next one. [`SplitReport`] records all of that so callers can
//! still tell "3 of 5 pages" from "5 of 5" without parsing logs.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of one event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventReport {
    /// Destination file, `output_dir/output_name`.
    pub output_path: PathBuf,
    /// 1-indexed inclusive source range.
    pub start_page: usize,
    pub end_page: usize,
    /// Pages written to the output document, in paint order.
    pub painted_pages: usize,
    /// Pages skipped because the source has no such page.
    pub missing_pages: usize,
    /// Pages skipped because rendering or painting failed.
    pub page_errors: Vec<PageError>,
    /// Set when the output file could not be created or written.
    pub error: Option<String>,
}

impl EventReport {
    /// Nominal width of the event's range.
    pub fn requested_pages(&self) -> usize {
        (self.end_page + 1).saturating_sub(self.start_page)
    }

    /// Pages that were requested but not painted.
    pub fn skipped_pages(&self) -> usize {
        self.missing_pages + self.page_errors.len()
    }

    /// `true` when the output file was written.
    pub fn is_written(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a whole run, one entry per event in input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplitReport {
    /// Page count of the source document.
    pub source_pages: usize,
    pub events: Vec<EventReport>,
    /// Wall-clock time of the run.
    pub duration_ms: u64,
}

impl SplitReport {
    /// Total pages painted across all outputs.
    pub fn painted_pages(&self) -> usize {
        self.events.iter().map(|e| e.painted_pages).sum()
    }

    /// Total pages skipped across all outputs.
    pub fn skipped_pages(&self) -> usize {
        self.events.iter().map(EventReport::skipped_pages).sum()
    }

    /// Events whose output file could not be produced.
    pub fn failed_events(&self) -> impl Iterator<Item = &EventReport> {
        self.events.iter().filter(|e| !e.is_written())
    }

    /// Paths of every output file that was written.
    pub fn written_files(&self) -> Vec<PathBuf> {
        self.events
            .iter()
            .filter(|e| e.is_written())
            .map(|e| e.output_path.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(painted: usize, missing: usize, error: Option<&str>) -> EventReport {
        EventReport {
            output_path: PathBuf::from("out.pdf"),
            start_page: 1,
            end_page: 4,
            painted_pages: painted,
            missing_pages: missing,
            page_errors: vec![],
            error: error.map(String::from),
        }
    }

    #[test]
    fn counts_add_up() {
        let mut e = event(2, 1, None);
        e.page_errors.push(PageError::RenderFailed {
            page: 3,
            detail: "x".into(),
        });
        assert_eq!(e.requested_pages(), 4);
        assert_eq!(e.skipped_pages(), 2);
        assert!(e.is_written());
    }

    #[test]
    fn report_aggregates() {
        let report = SplitReport {
            source_pages: 4,
            events: vec![event(4, 0, None), event(0, 0, Some("disk full"))],
            duration_ms: 12,
        };
        assert_eq!(report.painted_pages(), 4);
        assert_eq!(report.failed_events().count(), 1);
        assert_eq!(report.written_files(), vec![PathBuf::from("out.pdf")]);
    }

    #[test]
    fn report_serialises() {
        let report = SplitReport {
            source_pages: 1,
            events: vec![event(1, 0, None)],
            duration_ms: 3,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"painted_pages\":1"), "got: {json}");
    }
}
