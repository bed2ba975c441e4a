//! CLI binary for pdfsqueeze.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `CompressionConfig`, runs one compression and prints the outcome.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdfsqueeze::{
    compress, default_output_path, ensure_pdf_extension, CompressionConfig,
    CompressionProgressCallback, CompressionReport, ProgressCallback,
};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
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

/// Terminal progress: one bar per attempt, reset on every retry, with a log
/// line per measured attempt.
struct CliProgressCallback {
    bar: ProgressBar,
    target_kb: f64,
}

impl CliProgressCallback {
    fn new(target_kb: f64) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar, target_kb })
    }
}

impl CompressionProgressCallback for CliProgressCallback {
    fn on_compression_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Compressing {total_pages} pages to ≤ {:.0} KB…",
                self.target_kb
            ))
        ));
    }

    fn on_attempt_start(&self, attempt: usize, quality: u8) {
        self.bar.reset();
        self.bar.set_prefix(format!("Attempt {attempt}"));
        self.bar.set_message(format!("quality {quality}"));
    }

    fn on_page_encoded(&self, _page_num: usize, _total_pages: usize, _encoded_bytes: usize) {
        self.bar.inc(1);
    }

    fn on_attempt_complete(&self, attempt: usize, quality: u8, size_kb: f64) {
        let fits = size_kb <= self.target_kb;
        self.bar.println(format!(
            "  {} Attempt {:>2}  quality {:>3}  {}",
            if fits { green("✓") } else { red("✗") },
            attempt,
            quality,
            dim(&format!("{size_kb:>10.2} KB")),
        ));
    }

    fn on_compression_complete(&self, _report: &CompressionReport) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Shrink to ≤ 1000 KB (defaults: scale 0.5, quality 75)
  pdfsqueeze scan.pdf

  # Explicit output and a tighter target
  pdfsqueeze scan.pdf -o small --max-size-kb 300

  # Sharper pages, more attempts likely
  pdfsqueeze --scale 1.0 --quality 90 brochure.pdf -o brochure_small.pdf

  # Machine-readable report
  pdfsqueeze --json scan.pdf > report.json

HOW IT WORKS:
  Every page is rendered to a bitmap at --scale (1.0 = 72 DPI), encoded as
  JPEG at --quality and placed on its own page. If the result is larger than
  --max-size-kb the whole document is rebuilt with quality lowered by 10,
  until it fits or quality would drop below 1.

  The output is image-only: text is no longer selectable.

EXIT STATUS:
  0  output fits the target
  1  fatal error (unreadable input, render/encode/write failure)
  2  target unreachable; the smallest attempt is left at the output path

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory)
  RUST_LOG          Override log filter (e.g. pdfsqueeze=debug)
"#;

/// Shrink a PDF below a target size by rasterising its pages to JPEG.
#[derive(Parser, Debug)]
#[command(
    name = "pdfsqueeze",
    version,
    about = "Shrink a PDF below a target size by rasterising its pages to JPEG",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Output PDF path (".pdf" appended if missing). Default: <input>_compressed.pdf
    #[arg(short, long, env = "PDFSQUEEZE_OUTPUT")]
    output: Option<PathBuf>,

    /// Maximum output size in KB (inclusive).
    #[arg(short = 'm', long, env = "PDFSQUEEZE_MAX_SIZE_KB", default_value_t = 1000.0)]
    max_size_kb: f64,

    /// Rasterisation scale in (0, 1]; 1.0 renders at 72 DPI.
    #[arg(short, long, env = "PDFSQUEEZE_SCALE", default_value_t = 0.5)]
    scale: f32,

    /// Initial JPEG quality (1–100), lowered by 10 per retry.
    #[arg(long, env = "PDFSQUEEZE_QUALITY", default_value_t = 75,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFSQUEEZE_PASSWORD")]
    password: Option<String>,

    /// Print the CompressionReport as JSON on stdout.
    #[arg(long, env = "PDFSQUEEZE_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFSQUEEZE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFSQUEEZE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFSQUEEZE_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("{} {:#}", red("✘"), e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the target was unreachable.
async fn run() -> Result<bool> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
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

    let output = cli
        .output
        .as_ref()
        .map(|p| ensure_pdf_extension(p))
        .unwrap_or_else(|| default_output_path(&cli.input));

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new(cli.max_size_kb) as Arc<dyn CompressionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    let report = compress(&cli.input, &output, &config)
        .await
        .context("Compression failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        eprintln!(
            "{} {}",
            if report.is_success() {
                green("✔")
            } else {
                red("✘")
            },
            report.summary()
        );
        eprintln!(
            "   {}",
            dim(&format!(
                "{} pages, {} attempts, {}ms",
                report.page_count,
                report.attempts.len(),
                report.total_duration_ms
            ))
        );
    }

    Ok(report.is_success())
}

/// Map CLI args to `CompressionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<CompressionConfig> {
    let mut builder = CompressionConfig::builder()
        .target_max_size_kb(cli.max_size_kb)
        .scale_factor(cli.scale)
        .quality(cli.quality);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
