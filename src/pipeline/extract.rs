//! Text extraction: pull the per-page text layer out of the handbook PDF.
//!
//! pdf-extract is synchronous and CPU-bound, so the actual decode runs inside
//! `tokio::task::spawn_blocking` to keep it off the async worker threads.
//! The output carries inline `[PAGE N]` markers — the prompt tells the model
//! about them so findings can cite the page a policy appears on.
//!
//! A document where no page yields any text (a pure image scan) is a fatal
//! [`AuditError::NoTextLayer`]: retrying a static file cannot change the
//! outcome, and the run must abort before any model call is attempted.

use crate::error::AuditError;
use crate::output::ExtractedDocument;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Extract all text from the PDF at `path`, with page tracking.
pub async fn extract_document(path: &Path) -> Result<ExtractedDocument, AuditError> {
    let owned = path.to_path_buf();

    let pages = tokio::task::spawn_blocking(move || extract_pages_blocking(&owned))
        .await
        .map_err(|e| AuditError::Internal(format!("Extraction task panicked: {}", e)))??;

    let doc = assemble_pages(pages);
    if doc.has_no_text() {
        return Err(AuditError::NoTextLayer {
            path: path.to_path_buf(),
            pages: doc.page_count(),
        });
    }

    info!(
        "Extracted {} characters from {} pages",
        doc.text.len(),
        doc.page_count()
    );
    Ok(doc)
}

/// Blocking per-page extraction via pdf-extract.
fn extract_pages_blocking(path: &Path) -> Result<Vec<String>, AuditError> {
    debug!("Extracting text layer from {}", path.display());
    pdf_extract::extract_text_by_pages(path).map_err(|e| AuditError::ExtractionFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Assemble per-page texts into the marked-up document.
///
/// Pure so the marker format is testable without a PDF on disk. Page numbers
/// are 1-indexed for human display, matching what the prompt promises the
/// model.
pub fn assemble_pages(page_texts: Vec<String>) -> ExtractedDocument {
    let mut text = String::new();
    let mut pages = BTreeMap::new();

    for (i, page_text) in page_texts.into_iter().enumerate() {
        let page_num = i + 1;
        text.push_str(&format!("\n\n[PAGE {}]\n\n", page_num));
        text.push_str(&page_text);
        pages.insert(page_num, page_text);
    }

    ExtractedDocument { text, pages }
}
