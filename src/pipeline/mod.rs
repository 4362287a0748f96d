//! Pipeline stages for handbook auditing.
//!
//! Each submodule implements exactly one transformation step, which keeps
//! every stage independently testable. Data flows strictly forward; no stage
//! feeds back into an earlier one.
//!
//! ```text
//! input ──▶ extract ──▶ (prompt) ──▶ analyze ──▶ parse ──▶ report
//! (path/URL) (pdf-extract)           (LLM call)  (regex)   (lopdf)
//! ```
//!
//! 1. [`input`]   — canonicalise the user-supplied path or URL to a local file
//! 2. [`extract`] — pull the per-page text layer; runs in `spawn_blocking`
//!    because pdf-extract is synchronous and CPU-bound
//! 3. [`analyze`] — the one network stage: a single model call with a single
//!    rate-limit retry
//! 4. [`parse`]   — recover findings/summary/critical issues from the raw
//!    response text
//! 5. [`report`]  — lay the parsed data (or, on grammar mismatch, the raw
//!    text) out as a paginated PDF

pub mod analyze;
pub mod extract;
pub mod input;
pub mod parse;
pub mod report;
