//! CLI binary for greenshot.
//!
//! A thin shim over the library crate that maps CLI flags to `CheckConfig`
//! and prints the reconstructed transcript.

use anyhow::{Context, Result};
use clap::Parser;
use futures::stream::{self, StreamExt};
use greenshot::{
    check, check_to_file, format_greentext, CheckConfig, CheckOutput, Granularity,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
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

const AFTER_HELP: &str = r#"EXAMPLES:
  # Check a local screenshot (transcript to stdout)
  greenshot screenshot.png

  # Check an image URL and save the transcript
  greenshot https://i.imgur.com/abc123.png -o transcript.md

  # Batch mode: several screenshots at once
  greenshot a.png b.png c.png --concurrency 8

  # Skip OCR entirely and reformat raw text
  greenshot --text-file dump.txt

  # Stricter acceptance (higher quote-ratio bar)
  greenshot screenshot.png --strict

  # Structured JSON output with verdict and timings
  greenshot screenshot.png --json > result.json

EXIT STATUS:
  0  at least one input produced a valid greentext transcript
  1  no input did, or a pipeline error occurred

ENVIRONMENT VARIABLES:
  GREENSHOT_LANG      Tesseract language code (default: eng)
  GREENSHOT_OUTPUT    Default output file

SETUP:
  Tesseract must be installed and on the library path, e.g.
    apt install tesseract-ocr libtesseract-dev
"#;

/// Reconstruct greentext screenshots as Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "greenshot",
    version,
    about = "Reconstruct greentext screenshots as Markdown",
    long_about = "OCR a greentext screenshot (local file or URL), rebuild the story as \
Markdown, and verify it actually is a greentext before printing it. \
Invalid inputs report \"No greentext found.\" and exit non-zero.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image file paths or HTTP/HTTPS URLs.
    #[arg(required_unless_present = "text_file")]
    inputs: Vec<String>,

    /// Write the Markdown transcript to this file instead of stdout
    /// (single input only).
    #[arg(short, long, env = "GREENSHOT_OUTPUT")]
    output: Option<PathBuf>,

    /// Reformat raw text from this file, skipping image fetch and OCR.
    #[arg(long, conflicts_with = "inputs")]
    text_file: Option<PathBuf>,

    /// Segmentation granularity.
    #[arg(long, value_enum, default_value = "line")]
    granularity: GranularityArg,

    /// Minimum line count a transcript must exceed to be accepted.
    #[arg(long, default_value_t = 4)]
    min_lines: usize,

    /// Quote ratio a transcript must exceed to be accepted (0.0–1.0).
    #[arg(long, default_value_t = 0.4)]
    ratio_threshold: f64,

    /// Use the stricter acceptance profile (ratio 0.51).
    #[arg(long, conflicts_with = "ratio_threshold")]
    strict: bool,

    /// Backslash-escape consecutive quote lines. Defaults per granularity
    /// (on for line, off for paragraph).
    #[arg(long)]
    escape_quotes: Option<bool>,

    /// Tesseract language code.
    #[arg(long, env = "GREENSHOT_LANG", default_value = "eng")]
    lang: String,

    /// Integer upscale factor applied before OCR (1–8).
    #[arg(long, default_value_t = 4,
          value_parser = clap::value_parser!(u32).range(1..=8))]
    resize_factor: u32,

    /// Contrast boost factor (1.0 = unchanged).
    #[arg(long, default_value_t = 2.0)]
    contrast: f32,

    /// Number of concurrent checks in batch mode.
    #[arg(short, long, default_value_t = 4)]
    concurrency: usize,

    /// Output structured JSON (CheckOutput) instead of Markdown.
    #[arg(long)]
    json: bool,

    /// Disable the batch progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors and the transcript.
    #[arg(short, long)]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, default_value_t = 30)]
    download_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum GranularityArg {
    Line,
    Paragraph,
}

impl From<GranularityArg> for Granularity {
    fn from(v: GranularityArg) -> Self {
        match v {
            GranularityArg::Line => Granularity::Line,
            GranularityArg::Paragraph => Granularity::Paragraph,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The transcript goes to stdout; all diagnostics go to stderr so the
    // output stays pipeable.
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    // ── Raw text mode: no image, no OCR ──────────────────────────────────
    if let Some(ref path) = cli.text_file {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read text from {:?}", path))?;
        let transcript = format_greentext(&raw, &config);

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&transcript).context("Failed to serialise output")?
            );
            return Ok(());
        }
        if !transcript.verdict.is_valid {
            println!("No greentext found.");
            std::process::exit(1);
        }
        print_markdown(&transcript.markdown)?;
        return Ok(());
    }

    // ── Single input ─────────────────────────────────────────────────────
    if cli.inputs.len() == 1 {
        let input = &cli.inputs[0];
        let output = if let Some(ref output_path) = cli.output {
            let out = check_to_file(input, output_path, &config)
                .await
                .context("Check failed")?;
            if !cli.quiet {
                eprintln!(
                    "{}  {}  →  {}",
                    if out.verdict.is_valid {
                        green("✔")
                    } else {
                        red("✘")
                    },
                    dim(&out.stats.to_string()),
                    bold(&output_path.display().to_string()),
                );
            }
            out
        } else {
            check(input, &config).await.context("Check failed")?
        };

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?
            );
            return Ok(());
        }
        if !output.verdict.is_valid {
            println!("No greentext found.");
            std::process::exit(1);
        }
        if cli.output.is_none() {
            print_markdown(&output.markdown)?;
            if !cli.quiet {
                eprintln!(
                    "{}  {} lines, {:.0}% quotes  {}",
                    green("✔"),
                    output.verdict.line_count,
                    output.verdict.quote_ratio * 100.0,
                    dim(&output.stats.to_string()),
                );
            }
        }
        return Ok(());
    }

    // ── Batch mode ───────────────────────────────────────────────────────
    if cli.output.is_some() {
        anyhow::bail!("--output only applies to a single input");
    }
    run_batch(&cli, &config).await
}

/// Check every input concurrently and print one status line per result.
async fn run_batch(cli: &Cli, config: &CheckConfig) -> Result<()> {
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let bar = if show_progress {
        let bar = ProgressBar::new(cli.inputs.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} images",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Checking");
        Some(bar)
    } else {
        None
    };

    let results: Vec<(String, Result<CheckOutput, greenshot::GreenshotError>)> =
        stream::iter(cli.inputs.iter().cloned())
            .map(|input| {
                let config = config.clone();
                let bar = bar.clone();
                async move {
                    let result = check(&input, &config).await;
                    if let Some(ref bar) = bar {
                        bar.inc(1);
                    }
                    (input, result)
                }
            })
            .buffer_unordered(config.concurrency)
            .collect()
            .await;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    if cli.json {
        let entries: Vec<serde_json::Value> = results
            .iter()
            .map(|(input, result)| match result {
                Ok(out) => serde_json::json!({ "input": input, "result": out }),
                Err(e) => serde_json::json!({ "input": input, "error": e.to_string() }),
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&entries).context("Failed to serialise output")?
        );
    }

    let mut valid = 0usize;
    let mut failed = 0usize;
    for (input, result) in &results {
        match result {
            Ok(out) if out.verdict.is_valid => {
                valid += 1;
                if !cli.json {
                    println!("{}  {}", green("✔"), input);
                    print_markdown(&out.markdown)?;
                    println!();
                }
            }
            Ok(out) => {
                if !cli.json && !cli.quiet {
                    eprintln!(
                        "{}  {}  {} lines, {:.0}% quotes — no greentext found",
                        red("✘"),
                        input,
                        out.verdict.line_count,
                        out.verdict.quote_ratio * 100.0,
                    );
                }
            }
            Err(e) => {
                failed += 1;
                if !cli.json {
                    eprintln!("{}  {}  {}", red("✘"), input, e);
                }
            }
        }
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "{} {}/{} valid  ({} failed)",
            if valid > 0 { green("✔") } else { red("✘") },
            bold(&valid.to_string()),
            results.len(),
            failed,
        );
    }
    if valid == 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Write the transcript to stdout with a guaranteed trailing newline.
fn print_markdown(markdown: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(markdown.as_bytes())
        .context("Failed to write to stdout")?;
    if !markdown.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}

/// Map CLI args to `CheckConfig`.
fn build_config(cli: &Cli) -> Result<CheckConfig> {
    let mut builder = CheckConfig::builder()
        .granularity(cli.granularity.clone().into())
        .min_lines(cli.min_lines)
        .ratio_threshold(if cli.strict {
            CheckConfig::STRICT_RATIO
        } else {
            cli.ratio_threshold
        })
        .resize_factor(cli.resize_factor)
        .contrast_factor(cli.contrast)
        .ocr_language(&cli.lang)
        .concurrency(cli.concurrency)
        .download_timeout_secs(cli.download_timeout);

    if let Some(escape) = cli.escape_quotes {
        builder = builder.escape_consecutive_quotes(escape);
    }

    builder.build().context("Invalid configuration")
}
