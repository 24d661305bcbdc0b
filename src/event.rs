//! Split events: which source pages go into which output file.
//!
//! An event is a 1-indexed, inclusive page range plus the file name its
//! output document gets inside the run's output directory. Events are
//! independent: ranges may overlap, may run past the end of the source
//! (missing pages are skipped), and are processed in list order.
//!
//! Events usually come from one of three places:
//!
//! * built directly with [`SplitEvent::new`];
//! * parsed from the CLI shorthand `START-END:NAME` via [`SplitEvent::parse`];
//! * read from a JSON events file via [`load_events`], which accepts plain
//!   events and docket-style [`CaseEvent`]s whose output names are derived
//!   from a base name, event number, page range and date.

use crate::error::SplitError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Component, Path};

static UNSAFE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("static regex"));

/// One output document: source pages `start_page..=end_page` (1-indexed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitEvent {
    pub start_page: usize,
    pub end_page: usize,
    pub output_name: String,
}

impl SplitEvent {
    pub fn new(start_page: usize, end_page: usize, output_name: impl Into<String>) -> Self {
        Self {
            start_page,
            end_page,
            output_name: output_name.into(),
        }
    }

    /// 0-indexed source page indices covered by this event, in paint order.
    ///
    /// Only meaningful for a validated event.
    pub fn page_indices(&self) -> RangeInclusive<usize> {
        self.start_page.saturating_sub(1)..=self.end_page.saturating_sub(1)
    }

    /// Nominal number of pages, `end - start + 1`.
    pub fn requested_pages(&self) -> usize {
        (self.end_page + 1).saturating_sub(self.start_page)
    }

    /// Check `1 <= start_page <= end_page` and that `output_name` is a
    /// non-empty relative path that stays inside the output directory.
    ///
    /// `index` is the event's 0-based position, used in the error.
    pub fn validate(&self, index: usize) -> Result<(), SplitError> {
        let invalid = |reason: String| SplitError::InvalidEvent { index, reason };

        if self.start_page < 1 {
            return Err(invalid(format!(
                "start_page must be >= 1 (got {})",
                self.start_page
            )));
        }
        if self.start_page > self.end_page {
            return Err(invalid(format!(
                "start_page {} is after end_page {}",
                self.start_page, self.end_page
            )));
        }
        if self.output_name.trim().is_empty() {
            return Err(invalid("output_name is empty".into()));
        }
        let name = Path::new(&self.output_name);
        if name.is_absolute() {
            return Err(invalid(format!(
                "output_name '{}' must be relative to the output directory",
                self.output_name
            )));
        }
        if name
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            return Err(invalid(format!(
                "output_name '{}' escapes the output directory",
                self.output_name
            )));
        }
        Ok(())
    }

    /// Parse the CLI shorthand `START-END:NAME` or `PAGE:NAME`.
    pub fn parse(s: &str) -> Result<Self, SplitError> {
        let bad = |reason: &str| SplitError::InvalidEvent {
            index: 0,
            reason: format!("'{s}': {reason}"),
        };

        let (range, name) = s
            .split_once(':')
            .ok_or_else(|| bad("expected START-END:NAME"))?;
        let range = range.trim();

        let (start, end) = match range.split_once('-') {
            Some((a, b)) => (a.trim(), b.trim()),
            None => (range, range),
        };
        let start: usize = start.parse().map_err(|_| bad("invalid start page"))?;
        let end: usize = end.parse().map_err(|_| bad("invalid end page"))?;

        let event = SplitEvent::new(start, end, name.trim());
        event.validate(0)?;
        Ok(event)
    }
}

/// A docket-style event: numbered, dated, named after the source document.
///
/// ```rust
/// use pdf_eventsplit::CaseEvent;
///
/// let e = CaseEvent { number: 4, start_page: 10, end_page: 12, date: "2024-03-01 09:30".into() };
/// let split = e.to_split_event("case_0042");
/// assert_eq!(split.output_name, "case_0042_event_4_start_10_end_12_2024-03-01_09_30.pdf");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseEvent {
    pub number: u32,
    pub start_page: usize,
    pub end_page: usize,
    #[serde(default)]
    pub date: String,
}

impl CaseEvent {
    /// Derive the output name `{base}_event_{n}_start_{a}_end_{b}_{date}.pdf`.
    pub fn to_split_event(&self, base_name: &str) -> SplitEvent {
        let mut name = format!(
            "{}_event_{}_start_{}_end_{}",
            sanitize_component(base_name),
            self.number,
            self.start_page,
            self.end_page
        );
        let date = sanitize_component(&self.date);
        if !date.is_empty() {
            name.push('_');
            name.push_str(&date);
        }
        name.push_str(".pdf");
        SplitEvent::new(self.start_page, self.end_page, name)
    }
}

/// Replace runs of characters that are unsafe in file names with `_`.
pub fn sanitize_component(s: &str) -> String {
    UNSAFE_NAME_CHARS
        .replace_all(s.trim(), "_")
        .trim_matches('_')
        .to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EventEntry {
    Plain(SplitEvent),
    Case(CaseEvent),
}

/// Parse a JSON array of events.
///
/// Entries may be plain `{start_page, end_page, output_name}` objects or
/// [`CaseEvent`] objects `{number, start_page, end_page, date}`; the latter
/// need `base_name` to derive their output names.
pub fn parse_events_json(json: &str, base_name: Option<&str>) -> Result<Vec<SplitEvent>, String> {
    let entries: Vec<EventEntry> = serde_json::from_str(json).map_err(|e| e.to_string())?;

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| match entry {
            EventEntry::Plain(e) => Ok(e),
            EventEntry::Case(c) => base_name
                .map(|base| c.to_split_event(base))
                .ok_or_else(|| format!("entry {i} is a case event but no base name was given")),
        })
        .collect()
}

/// Read events from a JSON file. See [`parse_events_json`].
pub fn load_events(path: &Path, base_name: Option<&str>) -> Result<Vec<SplitEvent>, SplitError> {
    let text = std::fs::read_to_string(path).map_err(|e| SplitError::EventsFile {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    parse_events_json(&text, base_name).map_err(|detail| SplitError::EventsFile {
        path: path.to_path_buf(),
        detail,
    })
}

/// Validate every event; the first violation aborts the run.
pub fn validate_events(events: &[SplitEvent]) -> Result<(), SplitError> {
    events
        .iter()
        .enumerate()
        .try_for_each(|(i, e)| e.validate(i))
}
