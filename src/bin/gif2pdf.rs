//! CLI binary for gif2pdf.
//!
//! A thin shell over the library crate: collects the selected GIFs, maps CLI
//! flags to `ConversionConfig`, runs the batch on a background worker and
//! renders its events.

use anyhow::{Context, Result};
use clap::Parser;
use gif2pdf::{
    collect_inputs, inspect, plan_batch, spawn_batch, BatchEvent, BatchSummary, ConversionConfig,
    FileOutcome, FrameEncoding, FrameSelection, FrameSizePolicy,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Bar positions are permille of the whole batch.
const BAR_SCALE: u64 = 1000;

// ── Batch display ────────────────────────────────────────────────────────────

/// Display side of a batch: owns the progress bar and renders worker events.
/// Nothing here is shared with the worker.
struct BatchDisplay {
    /// `None` when the bar is disabled; lines then go straight to stderr.
    bar: Option<ProgressBar>,
    quiet: bool,
    file_total: usize,
}

impl BatchDisplay {
    fn new(show_progress: bool, quiet: bool, file_total: usize, frame_total: usize) -> Self {
        let bar = show_progress.then(|| {
            let bar = ProgressBar::new(BAR_SCALE);
            let style = ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {percent:>3}%  \
                 ⏱ {elapsed_precise}  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS);
            bar.set_style(style);
            bar.set_prefix("Converting");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar.println(format!(
                "{} {}",
                cyan("◆"),
                bold(&format!(
                    "Converting {file_total} GIFs ({frame_total} frames)…"
                ))
            ));
            bar
        });
        Self {
            bar,
            quiet,
            file_total,
        }
    }

    fn line(&self, msg: String) {
        if self.quiet {
            return;
        }
        match self.bar {
            Some(ref bar) => bar.println(msg),
            None => eprintln!("{msg}"),
        }
    }

    fn handle(&mut self, event: &BatchEvent) {
        match event {
            BatchEvent::FileStarted {
                file_index,
                source,
                frame_count,
            } => {
                if let Some(ref bar) = self.bar {
                    bar.set_message(format!(
                        "{}/{} {} ({} frames)",
                        file_index + 1,
                        self.file_total,
                        file_name(source),
                        frame_count
                    ));
                }
            }
            BatchEvent::Progress(p) => {
                if let Some(ref bar) = self.bar {
                    bar.set_position((p.overall_fraction * BAR_SCALE as f64).round() as u64);
                }
            }
            BatchEvent::FileFinished(outcome) => self.file_finished(outcome),
            BatchEvent::BatchFinished(_) => {
                if let Some(ref bar) = self.bar {
                    bar.finish_and_clear();
                }
            }
        }
    }

    fn file_finished(&self, outcome: &FileOutcome) {
        let index = format!("{:>3}/{:<3}", outcome.file_index + 1, self.file_total);
        match outcome.result {
            Ok(ref stats) => self.line(format!(
                "  {} {}  {}  →  {}  {}",
                green("✓"),
                index,
                file_name(&outcome.source),
                outcome.destination.display(),
                dim(&format!(
                    "{} pages, {:.1}s",
                    stats.pages_written,
                    stats.total_duration_ms as f64 / 1000.0
                )),
            )),
            Err(ref e) => {
                // Truncate very long error messages to keep output tidy.
                let msg = if e.chars().count() > 80 {
                    format!("{}\u{2026}", e.chars().take(79).collect::<String>())
                } else {
                    e.clone()
                };
                self.line(format!(
                    "  {} {}  {}  {}",
                    red("✗"),
                    index,
                    file_name(&outcome.source),
                    red(&msg),
                ));
            }
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One GIF, PDF written next to it (dance.pdf)
  gif2pdf dance.gif

  # Every GIF in a directory, into another directory
  gif2pdf ./gifs --out-dir ./pdfs

  # Exact pixels, black behind transparent areas
  gif2pdf --lossless --background 000000 sprite.gif

  # Only frames 1 to 10, smaller JPEG pages
  gif2pdf --frames 1-10 --quality 70 long.gif

  # Frame count and size only, as JSON
  gif2pdf --inspect-only --json *.gif

ENVIRONMENT VARIABLES:
  Every option can also be set through a GIF2PDF_* variable, e.g.
  GIF2PDF_OUT_DIR, GIF2PDF_QUALITY, GIF2PDF_LOSSLESS, GIF2PDF_BACKGROUND.
  RUST_LOG overrides the log filter chosen from --verbose / --quiet.
"#;

/// Convert animated GIFs to PDF documents, one page per frame.
#[derive(Parser, Debug)]
#[command(
    name = "gif2pdf",
    version,
    about = "Convert animated GIFs to PDF documents, one page per frame",
    long_about = "Convert animated GIFs to PDF documents. Every frame becomes one page \
sized to the GIF's logical screen (one point per pixel). Files are converted one after \
another; a failed file is reported and the batch continues.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// GIF files or directories containing GIFs.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write PDFs into this directory instead of next to each GIF.
    #[arg(short, long, env = "GIF2PDF_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// JPEG quality for frame images (1–100).
    #[arg(long, env = "GIF2PDF_QUALITY", default_value_t = 90,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Store frames as lossless RGB instead of JPEG.
    #[arg(long, env = "GIF2PDF_LOSSLESS")]
    lossless: bool,

    /// Colour behind transparent pixels, as RRGGBB.
    #[arg(long, env = "GIF2PDF_BACKGROUND", default_value = "ffffff")]
    background: String,

    /// Fail a file whose frames differ in size instead of stretching them.
    #[arg(long, env = "GIF2PDF_STRICT_SIZE")]
    strict_size: bool,

    /// Frame selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "GIF2PDF_FRAMES", default_value = "all")]
    frames: String,

    /// Directory for temporary frame files.
    #[arg(long, env = "GIF2PDF_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Do not write a PDF Info dictionary.
    #[arg(long, env = "GIF2PDF_NO_METADATA")]
    no_metadata: bool,

    /// Print the batch summary (or inspect output) as JSON on stdout.
    #[arg(long, env = "GIF2PDF_JSON")]
    json: bool,

    /// Print GIF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "GIF2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "GIF2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "GIF2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar is the feedback while it is visible; library INFO
    // lines would only tear it.
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

    // ── Selection ────────────────────────────────────────────────────────
    let inputs = collect_inputs(&cli.inputs);
    if inputs.is_empty() {
        anyhow::bail!("No GIF files selected: select GIF files to convert");
    }

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        return inspect_all(&inputs, cli.json);
    }

    // ── Build config, plan, run ──────────────────────────────────────────
    let config = build_config(&cli)?;

    if let Some(ref dir) = cli.out_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    let plan = {
        let config = config.clone();
        let out_dir = cli.out_dir.clone();
        tokio::task::spawn_blocking(move || plan_batch(inputs, out_dir.as_deref(), &config))
            .await
            .context("Planning the batch failed")?
    };

    let mut display = BatchDisplay::new(show_progress, cli.quiet, plan.len(), plan.total_frames);
    let mut handle = spawn_batch(plan, config);
    while let Some(event) = handle.recv().await {
        display.handle(&event);
    }
    let summary = handle.join().await.context("Batch failed")?;

    report(&summary, &cli)?;

    if summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Print the final summary line (or the JSON summary).
fn report(summary: &BatchSummary, cli: &Cli) -> Result<()> {
    if cli.json {
        let json = serde_json::to_string_pretty(summary).context("Failed to serialise summary")?;
        println!("{json}");
        return Ok(());
    }
    if cli.quiet {
        return Ok(());
    }

    if summary.failed == 0 {
        eprintln!(
            "{} {} GIFs converted  {}  {}",
            green("✔"),
            bold(&summary.succeeded.to_string()),
            dim(&format!("{} pages", summary.pages_written)),
            dim(&format!("{}ms", summary.total_duration_ms)),
        );
    } else {
        eprintln!(
            "{} {}/{} GIFs converted  ({} failed)  {}",
            if summary.succeeded == 0 {
                red("✘")
            } else {
                cyan("⚠")
            },
            bold(&summary.succeeded.to_string()),
            summary.total_files,
            red(&summary.failed.to_string()),
            dim(&format!("{}ms", summary.total_duration_ms)),
        );
    }
    Ok(())
}

fn inspect_all(inputs: &[PathBuf], json: bool) -> Result<()> {
    if json {
        let mut entries = Vec::with_capacity(inputs.len());
        for path in inputs {
            let meta = inspect(path)
                .with_context(|| format!("Failed to inspect {}", path.display()))?;
            entries.push(serde_json::json!({ "path": path, "metadata": meta }));
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).context("Failed to serialize metadata")?
        );
        return Ok(());
    }

    for path in inputs {
        let meta =
            inspect(path).with_context(|| format!("Failed to inspect {}", path.display()))?;
        println!("File:         {}", path.display());
        println!("Size:         {}x{}", meta.width, meta.height);
        println!("Frames:       {}", meta.frame_count);
        println!("Duration:     {}ms", meta.total_duration_ms);
        println!("File size:    {} bytes", meta.file_size);
        println!();
    }
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let encoding = if cli.lossless {
        FrameEncoding::Lossless
    } else {
        FrameEncoding::Jpeg {
            quality: cli.quality,
        }
    };
    let size_policy = if cli.strict_size {
        FrameSizePolicy::Reject
    } else {
        FrameSizePolicy::Stretch
    };

    let mut builder = ConversionConfig::builder()
        .frame_encoding(encoding)
        .background(parse_background(&cli.background)?)
        .size_policy(size_policy)
        .frames(parse_frames(&cli.frames)?)
        .include_metadata(!cli.no_metadata);

    if let Some(ref dir) = cli.temp_dir {
        builder = builder.temp_dir(dir);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--background` (`RRGGBB`, optional leading `#`).
fn parse_background(s: &str) -> Result<[u8; 3]> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        anyhow::bail!("Background must be RRGGBB hex, got '{}'", s);
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .with_context(|| format!("Invalid hex colour '{}'", s))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

/// Parse `--frames` string into `FrameSelection`.
fn parse_frames(s: &str) -> Result<FrameSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(FrameSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start frame in range")?;
        let end: usize = end.trim().parse().context("Invalid end frame in range")?;

        if start < 1 {
            anyhow::bail!("Frames are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid frame range '{}-{}': start must be <= end",
                start,
                end
            );
        }

        return Ok(FrameSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let frames: Vec<usize> = s
            .split(',')
            .map(|f| {
                f.trim()
                    .parse::<usize>()
                    .context(format!("Invalid frame number: '{}'", f.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(&f) = frames.iter().find(|&&f| f < 1) {
            anyhow::bail!("Frames are 1-indexed, minimum is 1 (got {})", f);
        }

        return Ok(FrameSelection::Set(frames));
    }

    // Single frame: "5"
    let frame: usize = s.parse().context("Invalid frame number")?;
    if frame < 1 {
        anyhow::bail!("Frames are 1-indexed, minimum is 1 (got {})", frame);
    }

    Ok(FrameSelection::Single(frame))
}
