//! CLI binary for thermo-extract.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and writes the record JSON.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thermo_extract::{
    extract_markdown, extract_pdf, inspect, records_to_json, write_records, ExtractionConfig,
    ExtractionOutput, ExtractionProgressCallback, PageSelection, ProgressCallback,
};
use tracing_subscriber::EnvFilter;

const PREVIEW_PAGES: usize = 3;
const PREVIEW_LINES: usize = 10;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner that names the strategy currently running and logs one line per
/// finished strategy above it.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Loading");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        self.bar.set_prefix("Extracting");
        self.bar.set_message(format!("{total_pages} pages"));
    }

    fn on_strategy_start(&self, strategy: &str) {
        self.bar.set_message(strategy.to_string());
    }

    fn on_strategy_complete(&self, strategy: &str, found: usize) {
        let unit = if strategy == "text_scrape" { "records" } else { "tables" };
        let mark = if found > 0 { green("✓") } else { dim("·") };
        self.bar
            .println(format!("  {mark} {strategy:<12} {}", dim(&format!("{found:>4} {unit}"))));
    }

    fn on_strategy_error(&self, strategy: &str, error: &str) {
        let msg = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} {strategy:<12} {}", red("✗"), red(&msg)));
    }

    fn on_extraction_complete(&self, records: usize) {
        self.bar.finish_and_clear();
        let mark = if records > 0 { green("✔") } else { red("✘") };
        eprintln!("{mark} {} records recovered", bold(&records.to_string()));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # PDF report to JSON file
  thermo2json pdf thermo_tables.pdf thermo_tables.json

  # Print recovered records to stdout, diagnostics after writing
  thermo2json pdf --verbose report.pdf

  # Only pages 3-15, show the first lines of each page first
  thermo2json pdf --pages 3-15 --debug report.pdf out.json

  # Semi-structured text table
  thermo2json markdown enthalpy.md enthalpy.json

  # Peek at the text layer without extracting
  thermo2json inspect report.pdf

ENVIRONMENT VARIABLES:
  THERMO2JSON_PAGES       Default for --pages
  THERMO2JSON_SENTINEL    Default for --sentinel
  THERMO2JSON_HEADER      Default for --header
  RUST_LOG                Override the log filter
"#;

/// Convert thermochemical tables in PDF reports and text files to JSON.
#[derive(Parser, Debug)]
#[command(
    name = "thermo2json",
    version,
    about = "Recover thermochemical records from PDF reports and text tables as JSON",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(long, global = true, env = "THERMO2JSON_LOG_DEBUG")]
    log_debug: bool,

    /// Suppress all output except errors and the JSON itself.
    #[arg(short, long, global = true, env = "THERMO2JSON_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract records from a tabular PDF report.
    Pdf(PdfArgs),
    /// Extract records from a semi-structured text (markdown) table.
    Markdown(MarkdownArgs),
    /// Print the first lines of the first pages of a PDF.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct PdfSource {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "THERMO2JSON_PASSWORD")]
    password: Option<String>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "THERMO2JSON_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(Args, Debug)]
struct PdfArgs {
    #[command(flatten)]
    source: PdfSource,

    /// Write JSON to this file instead of stdout.
    output: Option<PathBuf>,

    /// Print diagnostics after writing the JSON.
    #[arg(short, long)]
    verbose: bool,

    /// Print the first lines of the first pages before extracting.
    #[arg(short, long)]
    debug: bool,

    /// Page selection: all, 5, 3-15, or a list such as 1,4-6,9.
    #[arg(long, env = "THERMO2JSON_PAGES", default_value = "all")]
    pages: String,

    /// Disable the last-resort text scraper.
    #[arg(long)]
    no_text_scrape: bool,

    /// Segments a scraped line needs to become a record.
    #[arg(long, default_value_t = 3)]
    min_segments: usize,

    /// Disable the progress spinner.
    #[arg(long, env = "THERMO2JSON_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct MarkdownArgs {
    /// Text file holding the table.
    input: PathBuf,

    /// Write JSON to this file instead of stdout.
    output: Option<PathBuf>,

    /// Print diagnostics after writing the JSON.
    #[arg(short, long)]
    verbose: bool,

    /// Species name that marks the first record.
    #[arg(long, env = "THERMO2JSON_SENTINEL")]
    sentinel: Option<String>,

    /// Header phrase used when the sentinel is absent.
    #[arg(long, env = "THERMO2JSON_HEADER")]
    header: Option<String>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[command(flatten)]
    source: PdfSource,

    /// Pages to preview.
    #[arg(long, default_value_t = PREVIEW_PAGES)]
    max_pages: usize,

    /// Non-blank lines per page.
    #[arg(long, default_value_t = PREVIEW_LINES)]
    max_lines: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives the feedback that matters; keep INFO logs out of it.
    let show_progress = matches!(&cli.command, Command::Pdf(a) if !a.no_progress) && !cli.quiet;
    let filter = if cli.log_debug {
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

    match cli.command {
        Command::Pdf(args) => run_pdf(args, show_progress, cli.quiet).await,
        Command::Markdown(args) => run_markdown(args, cli.quiet).await,
        Command::Inspect(args) => {
            let config = source_config(&args.source).build().context("Invalid configuration")?;
            print_previews(&args.source.input, &config, args.max_pages, args.max_lines).await
        }
    }
}

async fn run_pdf(args: PdfArgs, show_progress: bool, quiet: bool) -> Result<()> {
    let mut builder = source_config(&args.source)
        .pages(
            args.pages
                .parse::<PageSelection>()
                .with_context(|| format!("--pages {:?}", args.pages))?,
        )
        .text_scrape_fallback(!args.no_text_scrape)
        .min_scrape_segments(args.min_segments);
    if show_progress {
        builder = builder.progress_callback(CliProgressCallback::new() as ProgressCallback);
    }
    let config = builder.build().context("Invalid configuration")?;

    if args.debug {
        print_previews(&args.source.input, &config, PREVIEW_PAGES, PREVIEW_LINES).await?;
    }

    let output = extract_pdf(&args.source.input, &config)
        .await
        .context("PDF extraction failed")?;
    emit(&output, args.output.as_ref(), args.verbose, quiet).await
}

async fn run_markdown(args: MarkdownArgs, quiet: bool) -> Result<()> {
    let mut builder = ExtractionConfig::builder();
    if let Some(sentinel) = args.sentinel {
        builder = builder.sentinel_species(sentinel);
    }
    if let Some(header) = args.header {
        builder = builder.header_phrase(header);
    }
    let config = builder.build().context("Invalid configuration")?;

    let output = extract_markdown(&args.input, &config)
        .await
        .with_context(|| format!("Failed to extract records from {}", args.input.display()))?;
    emit(&output, args.output.as_ref(), args.verbose, quiet).await
}

/// Builder seeded with the settings shared by `pdf` and `inspect`.
fn source_config(source: &PdfSource) -> thermo_extract::ExtractionConfigBuilder {
    let mut builder = ExtractionConfig::builder().download_timeout_secs(source.download_timeout);
    if let Some(ref pwd) = source.password {
        builder = builder.password(pwd.clone());
    }
    builder
}

/// Write the JSON to `output` (or stdout), then the diagnostics if asked.
async fn emit(
    output: &ExtractionOutput,
    path: Option<&PathBuf>,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    match path {
        Some(path) => {
            write_records(path, &output.records)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !quiet {
                eprintln!(
                    "{}  {} records  {}ms  →  {}",
                    if output.records.is_empty() { red("✘") } else { green("✔") },
                    output.records.len(),
                    output.stats.total_duration_ms,
                    bold(&path.display().to_string()),
                );
            }
        }
        None => {
            let json = records_to_json(&output.records).context("Failed to serialise records")?;
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{json}").context("Failed to write to stdout")?;
        }
    }

    if verbose {
        println!("{}", output.diagnostics_line());
        for failure in &output.failures {
            eprintln!("  {} {}", dim("skipped:"), failure);
        }
    }
    Ok(())
}

async fn print_previews(
    input: &str,
    config: &ExtractionConfig,
    max_pages: usize,
    max_lines: usize,
) -> Result<()> {
    let previews = inspect(input, config, max_pages, max_lines)
        .await
        .context("Failed to inspect PDF")?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for preview in previews {
        writeln!(handle, "=== PAGE {} ===", preview.page_num)?;
        for (i, line) in preview.lines.iter().enumerate() {
            writeln!(handle, "{:>3}: {}", i + 1, line)?;
        }
    }
    Ok(())
}
