//! Error types for the handbook-audit library.
//!
//! Every variant here is **fatal to the run**: the pipeline aborts, no
//! partial report is written, and the message is meant to be shown to a
//! human operator as-is. The one non-fatal condition — the model response
//! not matching the expected grammar — is deliberately *not* an error: it
//! degrades to a verbatim-text report and is represented by
//! [`crate::output::AuditOutput::parsed`] being `None`.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the handbook-audit library.
#[derive(Debug, Error)]
pub enum AuditError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Handbook PDF not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The PDF library could not open or decode the document.
    #[error("Failed to extract text from '{path}': {detail}")]
    ExtractionFailed { path: PathBuf, detail: String },

    /// The document opened but produced no text on any page.
    ///
    /// Usually a pure image scan with no embedded text layer. Retrying a
    /// static file cannot change the outcome, so this is never retried.
    #[error(
        "No text produced from '{path}' ({pages} pages scanned).\n\
         The PDF appears to have no embedded text layer (image-only scan).\n\
         Run it through an OCR tool before auditing."
    )]
    NoTextLayer { path: PathBuf, pages: usize },

    // ── Configuration errors ──────────────────────────────────────────────
    /// No usable model credential/provider before any network activity.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Analysis errors ───────────────────────────────────────────────────
    /// The model call failed, including after the single rate-limit retry.
    #[error("Compliance analysis failed (retried: {retried}): {detail}")]
    AnalysisFailed { detail: String, retried: bool },

    /// The model call succeeded but returned an empty text segment.
    #[error("The model returned an empty response; nothing to report on.")]
    EmptyAnalysis,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output report file.
    #[error("Failed to write report file '{path}': {source}")]
    ReportWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_text_layer_display() {
        let e = AuditError::NoTextLayer {
            path: PathBuf::from("scan.pdf"),
            pages: 12,
        };
        let msg = e.to_string();
        assert!(msg.contains("scan.pdf"), "got: {msg}");
        assert!(msg.contains("12 pages"), "got: {msg}");
        assert!(msg.contains("No text produced"), "got: {msg}");
    }

    #[test]
    fn analysis_failed_mentions_retry() {
        let e = AuditError::AnalysisFailed {
            detail: "HTTP 429".into(),
            retried: true,
        };
        assert!(e.to_string().contains("retried: true"));
        assert!(e.to_string().contains("HTTP 429"));
    }

    #[test]
    fn provider_not_configured_display() {
        let e = AuditError::ProviderNotConfigured {
            provider: "anthropic".into(),
            hint: "Set ANTHROPIC_API_KEY".into(),
        };
        assert!(e.to_string().contains("anthropic"));
        assert!(e.to_string().contains("ANTHROPIC_API_KEY"));
    }
}
