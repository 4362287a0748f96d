//! # handbook-audit
//!
//! Audit an employee handbook PDF against California employment law using an
//! LLM, and render the result as a PDF compliance report.
//!
//! ## How it works
//!
//! The handbook's text layer is extracted with page markers and sent to the
//! model in a single prompt alongside a fixed 20-item checklist of California
//! requirements (at-will employment, meal and rest breaks, harassment
//! prevention, paid sick leave, and so on). The model answers in a
//! constrained plain-text structure; that structure is parsed with regular
//! expressions into typed findings, the summary counts are recomputed
//! locally, and the result is laid out as a paginated report.
//!
//! When the model drifts from the requested structure the run does not fail:
//! the report falls back to the raw analysis text, clearly labelled.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file or download from URL
//!  ├─ 2. Extract  per-page text layer via pdf-extract (spawn_blocking)
//!  ├─ 3. Analyze  one prompt, one completion, one rate-limit retry
//!  ├─ 4. Parse    regex pass over the structured response (fallible)
//!  └─ 5. Report   paginated PDF via lopdf, structured or degraded
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use handbook_audit::{audit_to_file, AuditConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from ANTHROPIC_API_KEY / OPENAI_API_KEY / …
//!     let config = AuditConfig::default();
//!     let stats = audit_to_file("handbook.pdf", "compliance_report.pdf", &config).await?;
//!     eprintln!("tokens: {} in / {} out",
//!         stats.input_tokens,
//!         stats.output_tokens);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `hbaudit` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! handbook-audit = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod audit;
pub mod checklist;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use audit::{audit, audit_sync, audit_to_file, extract, DEFAULT_MODEL};
pub use checklist::{ChecklistItem, CHECKLIST};
pub use config::{AuditConfig, AuditConfigBuilder};
pub use error::AuditError;
pub use output::{
    AuditOutput, AuditStats, Compliance, ComplianceFinding, ComplianceSummary, CriticalIssue,
    ExtractedDocument, ParsedAnalysis, RiskTier,
};
