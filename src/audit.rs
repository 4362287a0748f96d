//! Audit entry points: resolve, extract, analyze, parse, report.
//!
//! ## Pipeline order
//!
//! Extraction runs before the provider is resolved: a scanned PDF with no
//! text layer must abort the run before any credential is touched or any
//! token is spent. Parsing failure, by contrast, is not fatal — the run
//! still succeeds and the report falls back to the raw analysis text.

use crate::config::AuditConfig;
use crate::error::AuditError;
use crate::output::{AuditOutput, AuditStats, ExtractedDocument};
use crate::pipeline::{analyze, extract, input, parse, report};
use crate::prompts;
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Model used when the caller names neither a model nor a provider.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Audit a handbook PDF (local path or HTTP/HTTPS URL) against the
/// California employment-law checklist.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(AuditOutput)` on success. `output.parsed` is `None` when the model's
/// response did not match the expected structure; the raw text in
/// `output.analysis` is still the complete result.
///
/// # Errors
/// Returns `Err(AuditError)` only for fatal failures: unreadable input,
/// a PDF with no text layer, provider configuration problems, or a model
/// call that failed even after the rate-limit retry.
pub async fn audit(
    input_str: impl AsRef<str>,
    config: &AuditConfig,
) -> Result<AuditOutput, AuditError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting handbook audit: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let pdf_path = resolved.path().to_path_buf();
    let subject = subject_name(&pdf_path);

    // ── Step 2: Extract the text layer ───────────────────────────────────
    let extract_start = Instant::now();
    let document = extract::extract_document(&pdf_path).await?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    info!(
        "Extracted {} pages in {}ms",
        document.page_count(),
        extract_duration_ms
    );

    // ── Step 3: Resolve the provider ─────────────────────────────────────
    let provider = resolve_provider(config)?;

    // ── Step 4: Build the prompt ─────────────────────────────────────────
    let prompt = prompts::compliance_prompt(&document.text);

    // ── Step 5: Run the analysis ─────────────────────────────────────────
    let response = analyze::analyze(&provider, &prompt, config).await?;

    // ── Step 6: Parse the structured response ────────────────────────────
    let parsed = parse::parse_analysis(&response.text);
    match &parsed {
        Some(p) => info!(
            "Parsed {} findings, {} critical issues, grade {}",
            p.findings.len(),
            p.critical_issues.len(),
            p.summary.grade
        ),
        None => warn!("Response did not match the expected structure; report will be degraded"),
    }

    let stats = AuditStats {
        page_count: document.page_count(),
        extracted_chars: document.text.len(),
        prompt_chars: prompt.len(),
        input_tokens: response.input_tokens,
        output_tokens: response.output_tokens,
        rate_limit_retried: response.retried,
        parse_degraded: parsed.is_none(),
        extract_duration_ms,
        llm_duration_ms: response.duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Audit complete: {} input tokens, {} output tokens, {}ms total",
        stats.input_tokens, stats.output_tokens, stats.total_duration_ms
    );

    Ok(AuditOutput {
        subject,
        analysis: response.text,
        parsed,
        stats,
    })
}

/// Audit a handbook and write the PDF report directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial reports.
pub async fn audit_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &AuditConfig,
) -> Result<AuditStats, AuditError> {
    let output = audit(input_str, config).await?;
    let path = output_path.as_ref();
    let bytes = report::render_report(&output)?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AuditError::ReportWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &bytes)
        .await
        .map_err(|e| AuditError::ReportWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| AuditError::ReportWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    info!("Report written to {}", path.display());
    Ok(output.stats)
}

/// Synchronous wrapper around [`audit`].
///
/// Creates a temporary tokio runtime internally.
pub fn audit_sync(
    input_str: impl AsRef<str>,
    config: &AuditConfig,
) -> Result<AuditOutput, AuditError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AuditError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(audit(input_str, config))
}

/// Extract the handbook's text layer without running any analysis.
///
/// Does not require an LLM provider or API key.
pub async fn extract(input_str: impl AsRef<str>) -> Result<ExtractedDocument, AuditError> {
    let resolved = input::resolve_input(input_str.as_ref(), 120).await?;
    let pdf_path = resolved.path().to_path_buf();
    extract::extract_document(&pdf_path).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// The subject shown on the report: the handbook's file stem.
fn subject_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "handbook".to_string())
}

/// Instantiate a named provider with the given model.
fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, AuditError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        AuditError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`) — the caller constructed
///    the provider entirely; we use it as-is. Useful in tests or when the
///    caller needs custom middleware.
///
/// 2. **Named provider + model** (`config.provider_name`) — the caller named
///    a provider (e.g. `"anthropic"`) and optional model; the factory reads
///    the corresponding API key from the environment.
///
/// 3. **`ANTHROPIC_API_KEY` present** — the analysis prompt was tuned
///    against Claude, so an Anthropic key wins over full auto-detection
///    when several provider keys are set.
///
/// 4. **Full auto-detection** (`ProviderFactory::from_env`) — the factory
///    scans all known API key variables and picks the first available
///    provider.
fn resolve_provider(config: &AuditConfig) -> Result<Arc<dyn LLMProvider>, AuditError> {
    // 1) User-provided provider takes priority
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    // 2) Provider name + model
    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    // 3) Anthropic key present
    if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
        if !key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("anthropic", model);
        }
    }

    // 4) Full auto-detection
    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| AuditError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set ANTHROPIC_API_KEY, OPENAI_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_is_the_file_stem() {
        assert_eq!(
            subject_name(Path::new("/tmp/acme-handbook.pdf")),
            "acme-handbook"
        );
        assert_eq!(subject_name(Path::new("handbook.pdf")), "handbook");
    }

    #[tokio::test]
    async fn missing_input_fails_before_provider_resolution() {
        // No API key in the environment; the error must still be about the
        // file, proving extraction-order precedence over credentials.
        let config = AuditConfig::default();
        let err = audit("/no/such/handbook.pdf", &config).await.unwrap_err();
        assert!(matches!(err, AuditError::FileNotFound { .. }), "got: {err}");
    }
}
