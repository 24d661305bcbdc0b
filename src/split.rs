//! Split orchestration: events × pages through the pipeline.
//!
//! ```text
//! Init ──▶ PerEvent ──▶ PerPage ──▶ EventDone ──▶ … ──▶ RunDone
//!  │ load     │ open        │ render → gray → paint     │ finalize
//!  └─ fatal   └─ recorded   └─ skipped on failure       └─ always
//! ```
//!
//! Only a failure to set the run up (bad events, no pdfium, unloadable
//! source) is returned as `Err`. Everything after that degrades to "fewer
//! pages than requested" and is recorded in the [`SplitReport`].

use crate::config::{SplitConfig, RENDER_DPI};
use crate::engine;
use crate::error::SplitError;
use crate::event::{validate_events, SplitEvent};
use crate::output::{EventReport, SplitReport};
use crate::pipeline::composite::{Compositor, OutputSurface, PdfiumCompositor};
use crate::pipeline::grayscale::to_grayscale;
use crate::pipeline::load::{self, PageSource};
use crate::pipeline::raster::PageRender;
use crate::progress::{NoopProgressCallback, SplitProgressCallback};
use pdfium_render::prelude::Pdfium;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Split `input` into one PDF per event inside `output_dir`.
///
/// `output_dir` must already exist. Each output page is a 595 × 842 pt page
/// showing the source page rasterised at 96 DPI in grayscale.
///
/// This binds its own [`Pdfium`] for the duration of the call. A bound
/// instance holds pdfium's process-wide lock until it is dropped, so a caller
/// that already owns one must use [`split_with_pdfium`] instead.
///
/// # Errors
/// Returns `Err(SplitError)` only before any output is touched:
/// - an event violates `1 <= start_page <= end_page` or has a bad name
/// - pdfium cannot be bound
/// - the source is missing, unreadable, not a PDF, corrupt or encrypted
///
/// # Example
/// ```rust,no_run
/// use pdf_eventsplit::{split, SplitConfig, SplitEvent};
///
/// let events = vec![
///     SplitEvent::new(1, 2, "a.pdf"),
///     SplitEvent::new(4, 5, "b.pdf"),
///     SplitEvent::new(3, 3, "c.pdf"),
/// ];
/// let report = split("bundle.pdf", "out", &events, &SplitConfig::default())?;
/// assert_eq!(report.events.len(), 3);
/// # Ok::<(), pdf_eventsplit::SplitError>(())
/// ```
pub fn split(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    events: &[SplitEvent],
    config: &SplitConfig,
) -> Result<SplitReport, SplitError> {
    let input = input.as_ref();

    validate_events(events)?;
    // Cheap path checks first so a bad input is reported as such even when
    // pdfium itself is unavailable.
    load::validate_source(input)?;

    let pdfium = engine::bind(config.library_path.as_deref())?;
    split_with_pdfium(&pdfium, input, output_dir, events, config)
}

/// [`split`] on an already bound `pdfium`. `config.library_path` is ignored.
pub fn split_with_pdfium(
    pdfium: &Pdfium,
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    events: &[SplitEvent],
    config: &SplitConfig,
) -> Result<SplitReport, SplitError> {
    let input = input.as_ref();
    let output_dir = output_dir.as_ref();
    info!(
        "Starting split: {} → {} ({} events)",
        input.display(),
        output_dir.display(),
        events.len()
    );

    validate_events(events)?;
    let source = load::load(pdfium, input)?;
    let compositor = PdfiumCompositor::new(pdfium, config.paint_mode);

    Ok(split_with(&source, &compositor, output_dir, events, config))
}

/// Run [`split`] on tokio's blocking pool.
///
/// pdfium is CPU-bound and not async-aware, so the whole sequential run is
/// moved off the async worker threads in one piece. The blocking thread
/// binds its own [`Pdfium`] and waits while another thread still holds one.
pub async fn split_async(
    input: impl Into<PathBuf>,
    output_dir: impl Into<PathBuf>,
    events: Vec<SplitEvent>,
    config: SplitConfig,
) -> Result<SplitReport, SplitError> {
    let input = input.into();
    let output_dir = output_dir.into();

    tokio::task::spawn_blocking(move || split(&input, &output_dir, &events, &config))
        .await
        .map_err(|e| SplitError::Internal(format!("Split task panicked: {}", e)))?
}

/// Drive `source` and `compositor` through every event in order.
///
/// An invalid event is recorded as a failed event and nothing is opened for
/// it; the remaining events still run. [`split`] rejects such lists before
/// loading instead.
pub fn split_with<S, C>(
    source: &S,
    compositor: &C,
    output_dir: &Path,
    events: &[SplitEvent],
    config: &SplitConfig,
) -> SplitReport
where
    S: PageSource + ?Sized,
    C: Compositor + ?Sized,
{
    let started = Instant::now();
    let noop = NoopProgressCallback;
    let progress: &dyn SplitProgressCallback = match config.progress_callback {
        Some(ref cb) => cb.as_ref(),
        None => &noop,
    };

    let source_pages = source.page_count();
    progress.on_run_start(events.len(), source_pages);

    let mut reports = Vec::with_capacity(events.len());
    for (i, event) in events.iter().enumerate() {
        let report = match event.validate(i) {
            Ok(()) => run_event(
                source,
                compositor,
                output_dir,
                event,
                i + 1,
                events.len(),
                progress,
            ),
            Err(e) => rejected_event(output_dir, event, i + 1, &e, progress),
        };
        reports.push(report);
    }

    let report = SplitReport {
        source_pages,
        events: reports,
        duration_ms: started.elapsed().as_millis() as u64,
    };

    info!(
        "Split complete: {} events, {} pages painted, {} skipped, {}ms",
        report.events.len(),
        report.painted_pages(),
        report.skipped_pages(),
        report.duration_ms
    );
    progress.on_run_complete(report.events.len(), report.painted_pages());

    report
}

/// Report for an event that failed validation; no output is opened.
fn rejected_event(
    output_dir: &Path,
    event: &SplitEvent,
    event_num: usize,
    error: &SplitError,
    progress: &dyn SplitProgressCallback,
) -> EventReport {
    warn!("Event {}: {}", event_num, error);
    let msg = error.to_string();
    progress.on_event_complete(event_num, 0, Some(&msg));
    EventReport {
        output_path: output_dir.join(&event.output_name),
        start_page: event.start_page,
        end_page: event.end_page,
        error: Some(msg),
        ..Default::default()
    }
}

/// One event: open → pages → finalize. Never fails; problems are recorded.
fn run_event<S, C>(
    source: &S,
    compositor: &C,
    output_dir: &Path,
    event: &SplitEvent,
    event_num: usize,
    total_events: usize,
    progress: &dyn SplitProgressCallback,
) -> EventReport
where
    S: PageSource + ?Sized,
    C: Compositor + ?Sized,
{
    let output_path = output_dir.join(&event.output_name);
    let mut report = EventReport {
        output_path: output_path.clone(),
        start_page: event.start_page,
        end_page: event.end_page,
        ..Default::default()
    };

    info!(
        "Event {}/{}: pages {}-{} → {}",
        event_num,
        total_events,
        event.start_page,
        event.end_page,
        output_path.display()
    );
    progress.on_event_start(event_num, total_events, &output_path, event.requested_pages());

    let mut surface = match compositor.open(&output_path) {
        Ok(s) => s,
        Err(e) => {
            warn!("Event {}: cannot open output: {}", event_num, e);
            let msg = e.to_string();
            progress.on_event_complete(event_num, 0, Some(&msg));
            report.error = Some(msg);
            return report;
        }
    };

    // Pages past the end of the source are all missing; count them without
    // walking a possibly huge range.
    let total = source.page_count();
    let indices = event.page_indices();
    let (first, last) = (*indices.start(), *indices.end());
    let in_source_end = (last + 1).min(total);
    if last + 1 > total {
        report.missing_pages = last + 1 - first.max(total);
        debug!(
            "Event {}: {} pages beyond the end of the source, skipped",
            event_num, report.missing_pages
        );
    }

    for index in first..in_source_end {
        let page_num = index + 1;

        let pixels = match source.render_page(index, RENDER_DPI, RENDER_DPI) {
            PageRender::Rendered(pixels) => pixels,
            PageRender::Missing => {
                debug!("Event {}: page {} missing, skipped", event_num, page_num);
                report.missing_pages += 1;
                progress.on_page_skipped(event_num, page_num, "missing");
                continue;
            }
            PageRender::Failed(e) => {
                warn!("Event {}: {}", event_num, e);
                progress.on_page_skipped(event_num, page_num, &e.to_string());
                report.page_errors.push(e);
                continue;
            }
        };

        let gray = to_grayscale(pixels);
        match surface.paint(gray, page_num) {
            Ok(()) => {
                report.painted_pages += 1;
                progress.on_page_painted(event_num, page_num);
            }
            Err(e) => {
                warn!("Event {}: {}", event_num, e);
                progress.on_page_skipped(event_num, page_num, &e.to_string());
                report.page_errors.push(e);
            }
        }
    }

    match surface.finalize() {
        Ok(pages) => {
            debug!(
                "Event {}: {} written with {} pages",
                event_num,
                report.output_path.display(),
                pages
            );
            progress.on_event_complete(event_num, report.painted_pages, None);
        }
        Err(e) => {
            warn!("Event {}: {}", event_num, e);
            let msg = e.to_string();
            progress.on_event_complete(event_num, report.painted_pages, Some(&msg));
            report.error = Some(msg);
        }
    }

    report
}
