//! Configuration for a handbook audit.
//!
//! All behaviour is controlled through [`AuditConfig`], built via its
//! [`AuditConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs, serialise them for logging, and diff two runs to
//! understand why their outputs differ.

use crate::error::AuditError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Configuration for one audit run.
///
/// Built via [`AuditConfig::builder()`] or [`AuditConfig::default()`].
///
/// # Example
/// ```rust
/// use handbook_audit::AuditConfig;
///
/// let config = AuditConfig::builder()
///     .model("claude-sonnet-4-20250514")
///     .max_tokens(4000)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AuditConfig {
    /// LLM model identifier. If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "anthropic", "openai").
    /// If None along with `provider`, auto-detected from the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for the completion. Default: 0.0.
    ///
    /// The analysis is a classification task against fixed criteria;
    /// any sampling creativity only makes the grammar drift more likely.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 4000.
    ///
    /// Twenty six-field blocks plus the two summary sections fit comfortably;
    /// setting this lower truncates the response mid-block and costs findings.
    pub max_tokens: usize,

    /// Seconds to wait before the single rate-limit retry. Default: 60.
    ///
    /// One fixed back-off, one retry, nothing more — this is an interactive
    /// single-request tool, not a batch service, so a full resilience
    /// strategy (exponential backoff, queuing) would be dead weight.
    pub rate_limit_backoff_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.0,
            max_tokens: 4000,
            rate_limit_backoff_secs: 60,
            download_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for AuditConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("rate_limit_backoff_secs", &self.rate_limit_backoff_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .finish()
    }
}

impl AuditConfig {
    /// Create a new builder for `AuditConfig`.
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AuditConfig`].
#[derive(Debug)]
pub struct AuditConfigBuilder {
    config: AuditConfig,
}

impl AuditConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn rate_limit_backoff_secs(mut self, secs: u64) -> Self {
        self.config.rate_limit_backoff_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AuditConfig, AuditError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(AuditError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = AuditConfig::default();
        assert_eq!(c.max_tokens, 4000);
        assert_eq!(c.rate_limit_backoff_secs, 60);
        assert_eq!(c.temperature, 0.0);
        assert!(c.model.is_none());
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = AuditConfig::builder().temperature(5.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn builder_rejects_zero_max_tokens() {
        assert!(AuditConfig::builder().max_tokens(0).build().is_err());
    }

    #[test]
    fn debug_elides_provider() {
        let c = AuditConfig::default();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("provider: None"));
    }
}
