//! The model call: send the compliance prompt, return the raw analysis text.
//!
//! This module is intentionally thin — all prompt engineering lives in
//! [`crate::prompts`] so it can be changed without touching retry or
//! error-handling logic here.
//!
//! ## Retry strategy
//!
//! Exactly one retry, and only for rate limiting: on an error whose message
//! carries a known rate-limit signature, sleep a fixed interval (60 s by
//! default) and try once more. Any other failure, or a second failure after
//! the retry, aborts the run. The fixed sleep blocks the calling task, which
//! is acceptable because this tool handles one request at a time.

use crate::config::AuditConfig;
use crate::error::AuditError;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// Raw result of the model call.
#[derive(Debug, Clone)]
pub struct AnalysisResponse {
    /// First text segment of the completion, treated as opaque downstream.
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Whether the single rate-limit retry fired.
    pub retried: bool,
    pub duration_ms: u64,
}

/// Send the prompt as a single user message and return the response text.
///
/// The prompt carries the entire instruction; there is no separate system
/// role. Output length is bounded by `config.max_tokens`.
pub async fn analyze(
    provider: &Arc<dyn LLMProvider>,
    prompt: &str,
    config: &AuditConfig,
) -> Result<AnalysisResponse, AuditError> {
    let start = Instant::now();
    let messages = vec![ChatMessage::user(prompt)];
    let options = build_options(config);

    info!("Sending {} characters for compliance analysis", prompt.len());

    let first_err = match provider.chat(&messages, Some(&options)).await {
        Ok(response) => {
            return finish(
                response.content,
                response.prompt_tokens as u64,
                response.completion_tokens as u64,
                false,
                start,
            );
        }
        Err(e) => format!("{e}"),
    };

    if !is_rate_limit_error(&first_err) {
        return Err(AuditError::AnalysisFailed {
            detail: first_err,
            retried: false,
        });
    }

    warn!(
        "Rate limit hit; waiting {}s before the single retry",
        config.rate_limit_backoff_secs
    );
    sleep(Duration::from_secs(config.rate_limit_backoff_secs)).await;

    match provider.chat(&messages, Some(&options)).await {
        Ok(response) => finish(
            response.content,
            response.prompt_tokens as u64,
            response.completion_tokens as u64,
            true,
            start,
        ),
        Err(e) => Err(AuditError::AnalysisFailed {
            detail: format!("{e}"),
            retried: true,
        }),
    }
}

fn finish(
    text: String,
    input_tokens: u64,
    output_tokens: u64,
    retried: bool,
    start: Instant,
) -> Result<AnalysisResponse, AuditError> {
    let duration = start.elapsed();
    debug!(
        "Analysis complete: {} input tokens, {} output tokens, {:?}",
        input_tokens, output_tokens, duration
    );

    if text.trim().is_empty() {
        return Err(AuditError::EmptyAnalysis);
    }

    Ok(AnalysisResponse {
        text,
        input_tokens,
        output_tokens,
        retried,
        duration_ms: duration.as_millis() as u64,
    })
}

/// Build `CompletionOptions` from the audit config.
fn build_options(config: &AuditConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Detect rate limiting by known signatures in the failure message.
///
/// Providers surface HTTP 429 in several spellings; matching the message is
/// cruder than a typed error but works uniformly across providers.
pub fn is_rate_limit_error(message: &str) -> bool {
    let m = message.to_lowercase();
    m.contains("rate_limit") || m.contains("rate limit") || m.contains("429")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_defaults() {
        let config = AuditConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.0));
        assert_eq!(opts.max_tokens, Some(4000));
    }

    #[test]
    fn rate_limit_signatures() {
        assert!(is_rate_limit_error("rate_limit_error: too many requests"));
        assert!(is_rate_limit_error("HTTP 429 Too Many Requests"));
        assert!(is_rate_limit_error("Rate limit exceeded for model"));
        assert!(!is_rate_limit_error("HTTP 500 Internal Server Error"));
        assert!(!is_rate_limit_error("invalid api key"));
    }
}
