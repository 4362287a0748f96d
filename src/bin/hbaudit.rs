//! CLI binary for handbook-audit.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `AuditConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use handbook_audit::{audit, audit_to_file, extract, AuditConfig, DEFAULT_MODEL};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Audit a handbook, write <stem>_compliance_report.pdf next to it
  hbaudit handbook.pdf

  # Choose the report path
  hbaudit handbook.pdf -o acme_report.pdf

  # Audit a handbook hosted at a URL
  hbaudit https://example.com/hr/handbook.pdf

  # Use a specific model or provider
  hbaudit --model claude-sonnet-4-20250514 handbook.pdf
  hbaudit --provider openai --model gpt-4.1 handbook.pdf

  # Structured JSON result on stdout (findings, summary, stats)
  hbaudit --json handbook.pdf > result.json

  # Print the model's raw analysis text instead of writing a report
  hbaudit --raw handbook.pdf

  # Extract the handbook's text layer only (no API key needed)
  hbaudit --extract-only handbook.pdf

WHAT GETS CHECKED:
  The handbook text is reviewed against a fixed 20-item California
  employment-law checklist: at-will employment, harassment prevention
  (SB 1343), meal and rest breaks, overtime, paid sick leave, CFRA,
  lactation accommodation, final pay, and more. Each item is reported
  with a status, page references, risk level, and a recommendation.

ENVIRONMENT VARIABLES:
  ANTHROPIC_API_KEY       Anthropic API key (preferred provider)
  OPENAI_API_KEY          OpenAI API key
  HBAUDIT_MODEL           Override model ID
  HBAUDIT_PROVIDER        Override provider (anthropic, openai, gemini, ollama)

SETUP:
  1. Set API key:     export ANTHROPIC_API_KEY=sk-ant-...
  2. Audit:           hbaudit handbook.pdf

NOTE:
  The report is an automated review, not legal advice. Handbooks with no
  extractable text layer (pure image scans) are rejected; OCR the document
  first.
"#;

/// Audit an employee handbook PDF for California employment-law compliance.
#[derive(Parser, Debug)]
#[command(
    name = "hbaudit",
    version,
    about = "Audit an employee handbook PDF for California employment-law compliance",
    long_about = "Check an employee handbook (local file or URL) against a fixed 20-item \
California employment-law checklist using an LLM, and write the result as a PDF \
compliance report with per-item findings, risk levels, and recommendations.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local handbook PDF path or HTTP/HTTPS URL.
    input: String,

    /// Write the PDF report to this path (default: <stem>_compliance_report.pdf).
    #[arg(short, long, env = "HBAUDIT_OUTPUT")]
    output: Option<PathBuf>,

    /// LLM model ID.
    #[arg(
        long,
        env = "HBAUDIT_MODEL",
        long_help = "Model for the compliance analysis. Default: claude-sonnet-4-20250514. \
          The prompt was tuned against Claude; other models work but drift from the \
          expected response structure more often."
    )]
    model: Option<String>,

    /// LLM provider: anthropic, openai, gemini, ollama.
    #[arg(
        long,
        env = "HBAUDIT_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: anthropic, openai, gemini, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// Max LLM output tokens for the analysis.
    #[arg(long, env = "HBAUDIT_MAX_TOKENS", default_value_t = 4000)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "HBAUDIT_TEMPERATURE", default_value_t = 0.0)]
    temperature: f32,

    /// Seconds to wait before the single rate-limit retry.
    #[arg(long, env = "HBAUDIT_BACKOFF", default_value_t = 60)]
    backoff_secs: u64,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, env = "HBAUDIT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Output the structured result as JSON instead of writing a report.
    #[arg(long, env = "HBAUDIT_JSON")]
    json: bool,

    /// Print the model's raw analysis text instead of writing a report.
    #[arg(long)]
    raw: bool,

    /// Extract the handbook's text layer only, no analysis (no API key needed).
    #[arg(long)]
    extract_only: bool,

    /// Disable the spinner.
    #[arg(long, env = "HBAUDIT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "HBAUDIT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "HBAUDIT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active; the
    // spinner provides all the feedback that matters interactively.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.raw;
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

    // ── Extract-only mode ────────────────────────────────────────────────
    if cli.extract_only {
        let doc = extract(&cli.input)
            .await
            .context("Failed to extract handbook text")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&doc).context("Failed to serialise extraction")?
            );
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(doc.text.as_bytes())
                .context("Failed to write to stdout")?;
            if !doc.text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
            if !cli.quiet {
                eprintln!(
                    "{} {} pages, {} characters",
                    green("✔"),
                    doc.page_count(),
                    doc.text.len()
                );
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let mut config = AuditConfig::builder()
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .rate_limit_backoff_secs(cli.backoff_secs)
        .download_timeout_secs(cli.download_timeout)
        .build()
        .context("Invalid configuration")?;
    config.model = cli.model.clone();
    config.provider_name = cli.provider.clone();

    let spinner = if show_progress {
        Some(spawn_spinner(config.model.as_deref().unwrap_or(DEFAULT_MODEL)))
    } else {
        None
    };

    // ── JSON / raw modes: run the audit, print to stdout ─────────────────
    if cli.json || cli.raw {
        let output = audit(&cli.input, &config).await.context("Audit failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output.analysis.as_bytes())
                .context("Failed to write to stdout")?;
            if !output.analysis.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
        return Ok(());
    }

    // ── Default mode: write the PDF report ───────────────────────────────
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    let result = audit_to_file(&cli.input, &output_path, &config).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let stats = result.context("Audit failed")?;

    if !cli.quiet {
        eprintln!(
            "{}  {} pages analysed  {}ms  →  {}",
            green("✔"),
            stats.page_count,
            stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&stats.input_tokens.to_string()),
            dim(&stats.output_tokens.to_string()),
        );
        if stats.rate_limit_retried {
            eprintln!("   {}", dim("rate limit hit once; retried after backoff"));
        }
        if stats.parse_degraded {
            eprintln!(
                "{}  analysis did not match the expected structure — the report \
                 contains the raw text",
                yellow("⚠")
            );
        }
    }

    Ok(())
}

/// Spinner shown while the model call runs (a single long await, so no
/// page-by-page progress to report).
fn spawn_spinner(model: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Auditing");
    bar.set_message(format!("analysing handbook with {model}…"));
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Default report path: the handbook's stem plus `_compliance_report.pdf`,
/// in the current directory for URL inputs.
fn default_output_path(input: &str) -> PathBuf {
    let stem = if input.starts_with("http://") || input.starts_with("https://") {
        input
            .rsplit('/')
            .next()
            .map(|s| s.split('?').next().unwrap_or(s))
            .filter(|s| !s.is_empty())
            .map(|s| s.trim_end_matches(".pdf").to_string())
            .unwrap_or_else(|| "handbook".to_string())
    } else {
        PathBuf::from(input)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "handbook".to_string())
    };
    PathBuf::from(format!("{stem}_compliance_report.pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_for_local_path() {
        assert_eq!(
            default_output_path("/hr/acme-handbook.pdf"),
            PathBuf::from("acme-handbook_compliance_report.pdf")
        );
    }

    #[test]
    fn default_output_for_url() {
        assert_eq!(
            default_output_path("https://example.com/docs/handbook.pdf?v=2"),
            PathBuf::from("handbook_compliance_report.pdf")
        );
    }
}
