//! CLI binary for pdf-eventsplit.
//!
//! A thin shim over the library crate: gathers events from flags and/or an
//! events file, creates the output directory, and prints the report.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_eventsplit::{
    load_events, split, PaintMode, ProgressCallback, SplitConfig, SplitEvent, SplitProgressCallback,
    SplitReport,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one bar advancing per event, one log line per output.
struct CliProgressCallback {
    bar: ProgressBar,
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} events  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Splitting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            skipped: AtomicUsize::new(0),
        })
    }
}

impl SplitProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_events: usize, source_pages: usize) {
        self.bar.set_length(total_events as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Splitting {source_pages}-page PDF into {total_events} outputs…"
            ))
        ));
    }

    fn on_event_start(&self, _event_num: usize, _total: usize, output: &Path, _requested: usize) {
        let name = output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.skipped.store(0, Ordering::SeqCst);
        self.bar.set_message(name);
    }

    fn on_page_painted(&self, _event_num: usize, page_num: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_skipped(&self, _event_num: usize, _page_num: usize, _reason: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    fn on_event_complete(&self, event_num: usize, painted: usize, error: Option<&str>) {
        match error {
            None => {
                let skipped = self.skipped.load(Ordering::SeqCst);
                let note = if skipped > 0 {
                    dim(&format!("  ({skipped} skipped)"))
                } else {
                    String::new()
                };
                self.bar.println(format!(
                    "  {} Event {:>3}  {:>4} pages{}",
                    green("✓"),
                    event_num,
                    painted,
                    note
                ));
            }
            Some(msg) => {
                // Truncate very long error messages to keep output tidy.
                let msg = if msg.chars().count() > 80 {
                    format!("{}\u{2026}", msg.chars().take(79).collect::<String>())
                } else {
                    msg.to_string()
                };
                self.bar
                    .println(format!("  {} Event {:>3}  {}", red("✗"), event_num, red(&msg)));
            }
        }
        self.bar.inc(1);
    }

    fn on_run_complete(&self, _total_events: usize, _painted_pages: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Three outputs from a 5-page bundle
  pdfsplit bundle.pdf -d out --event 1-2:a.pdf --event 4-5:b.pdf --event 3:c.pdf

  # Events from a JSON file
  pdfsplit bundle.pdf -d out --events events.json

  # Docket-style events, names derived from a base name
  pdfsplit bundle.pdf -d out --events docket.json --base-name case_0042

  # Machine-readable report
  pdfsplit bundle.pdf -d out --events events.json --json > report.json

EVENTS FILE:
  A JSON array. Each entry is either
    {"start_page": 1, "end_page": 2, "output_name": "a.pdf"}
  or a docket event (requires --base-name)
    {"number": 7, "start_page": 3, "end_page": 4, "date": "2024-01-05"}
  which is written to {base}_event_{number}_start_{start}_end_{end}_{date}.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Override log filter (e.g. pdf_eventsplit=debug)
"#;

/// Split a PDF into grayscale per-event PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "pdfsplit",
    version,
    about = "Split a PDF into per-event grayscale PDFs",
    long_about = "Split a multi-page PDF into several PDFs, one per event (a page range and an \
output name). Every page is rasterised at 96 DPI, reduced to grayscale and painted onto an \
A4 page of the event's output.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Source PDF file.
    input: PathBuf,

    /// Directory receiving the output PDFs (created if missing).
    #[arg(short = 'd', long, env = "PDFSPLIT_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Event as START-END:NAME or PAGE:NAME. Repeatable; processed in order.
    #[arg(short, long = "event", value_name = "RANGE:NAME")]
    events: Vec<String>,

    /// JSON events file, processed after any --event flags.
    #[arg(long = "events", value_name = "FILE", env = "PDFSPLIT_EVENTS")]
    events_file: Option<PathBuf>,

    /// Base name for docket-style events. Defaults to the input file stem.
    #[arg(long, env = "PDFSPLIT_BASE_NAME")]
    base_name: Option<String>,

    /// How grayscale pixels are painted: alpha (8-bit ink mask) or luma.
    #[arg(long, env = "PDFSPLIT_PAINT_MODE", default_value = "alpha")]
    paint_mode: String,

    /// Path to libpdfium (file or directory).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print the SplitReport as JSON on stdout.
    #[arg(long, env = "PDFSPLIT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFSPLIT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFSPLIT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFSPLIT_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; -v brings them back.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let events = collect_events(&cli)?;
    if events.is_empty() {
        anyhow::bail!("No events given; use --event START-END:NAME or --events FILE");
    }

    // Output directory creation is the caller's job, not the library's.
    std::fs::create_dir_all(&cli.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            cli.output_dir.display()
        )
    })?;

    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn SplitProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress)?;

    let report = split(&cli.input, &cli.output_dir, &events, &config).context("Split failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        print_summary(&report);
    }

    Ok(())
}

/// `--event` flags first, then the events file, in their given order.
fn collect_events(cli: &Cli) -> Result<Vec<SplitEvent>> {
    let mut events = cli
        .events
        .iter()
        .map(|s| SplitEvent::parse(s).with_context(|| format!("Invalid --event '{s}'")))
        .collect::<Result<Vec<_>>>()?;

    if let Some(ref path) = cli.events_file {
        let base = cli.base_name.clone().or_else(|| {
            cli.input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        });
        events.extend(load_events(path, base.as_deref())?);
    }

    Ok(events)
}

/// Map CLI args to `SplitConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<SplitConfig> {
    let paint_mode: PaintMode = cli.paint_mode.parse().context("Invalid --paint-mode")?;

    let mut builder = SplitConfig::builder().paint_mode(paint_mode);
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.library_path(lib);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(report: &SplitReport) {
    let failed = report.failed_events().count();
    let requested: usize = report.events.iter().map(|e| e.requested_pages()).sum();

    eprintln!(
        "{}  {} outputs  {}/{} pages  {}ms",
        if failed == 0 && report.skipped_pages() == 0 {
            green("✔")
        } else {
            cyan("⚠")
        },
        report.events.len() - failed,
        report.painted_pages(),
        requested,
        report.duration_ms,
    );

    for e in report.failed_events() {
        eprintln!(
            "   {} {}: {}",
            red("✗"),
            e.output_path.display(),
            e.error.as_deref().unwrap_or("unknown error")
        );
    }
    if report.skipped_pages() > 0 {
        eprintln!(
            "   {}",
            dim(&format!(
                "{} pages skipped (missing or failed to render)",
                report.skipped_pages()
            ))
        );
    }
}
