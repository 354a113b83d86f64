//! Generation client with quota-aware retry and graceful degradation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use tscript_youtube::format_timestamp;

use crate::gemini::GenerationBackend;
use crate::metrics;
use crate::retry::{retry_async, GenerationAttempt, RetryPolicy, RetryResult, Retryable};

/// Sampling parameters passed through to the generation API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    /// Nucleus-sampling threshold
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

impl GenerationConfig {
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }
}

/// Generation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Quota or rate limit exceeded: {0}")]
    Quota(String),

    #[error("{0}")]
    Failed(String),

    #[error("Quota still exceeded after {attempts} attempts")]
    QuotaExhausted { attempts: u32 },
}

impl GenerationError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    /// Classify a failed call by HTTP status and error text.
    ///
    /// HTTP 429, or text mentioning `RESOURCE_EXHAUSTED`, `429` or `quota`
    /// (any case), is a quota error. Everything else is a plain failure.
    pub fn classify(status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if status == Some(429)
            || lower.contains("resource_exhausted")
            || lower.contains("429")
            || lower.contains("quota")
        {
            Self::Quota(message)
        } else {
            Self::Failed(message)
        }
    }

    pub fn is_quota(&self) -> bool {
        matches!(
            self,
            GenerationError::Quota(_) | GenerationError::QuotaExhausted { .. }
        )
    }
}

impl Retryable for GenerationError {
    fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::Quota(_))
    }

    fn error_class(&self) -> &'static str {
        match self {
            GenerationError::Quota(_) => "quota",
            GenerationError::Failed(_) => "other",
            GenerationError::QuotaExhausted { .. } => "quota_exhausted",
        }
    }
}

/// Result of [`GenerationClient::try_generate`] together with its attempt log.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub result: Result<String, GenerationError>,
    pub attempts: Vec<GenerationAttempt>,
}

/// How the final script text was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// Model output from the primary prompt
    Generated,
    /// Model output from the shorter fallback prompt
    GeneratedFromFallbackPrompt,
    /// Static template after quota exhaustion or deadline
    Template,
    /// Formatted message for a non-quota failure
    ErrorMessage,
}

/// Final script text. Never empty.
#[derive(Debug, Clone)]
pub struct GeneratedScript {
    pub text: String,
    pub kind: ScriptKind,
    pub attempts: Vec<GenerationAttempt>,
}

/// Message returned in place of a script when generation fails outright.
pub fn error_message(error: &GenerationError) -> String {
    format!("Script generation error: {error}")
}

/// Deterministic script skeleton used when generation is unavailable.
///
/// The main part lasts `duration_minutes - 1` minutes, at least 1.
pub fn fallback_script(duration_minutes: u32) -> String {
    let main_minutes = duration_minutes.saturating_sub(1).max(1);
    let unit = if main_minutes == 1 { "minute" } else { "minutes" };
    let summary_at = format_timestamp(f64::from(30 + main_minutes * 60));

    format!(
        "[00:00] Hook (15 seconds)\n\
         Open with a surprising fact or a question about the topic.\n\
         \n\
         [00:15] Introduction (15 seconds)\n\
         Introduce yourself and tell viewers what they will learn.\n\
         \n\
         [00:30] Main content ({main_minutes} {unit})\n\
         Walk through the key points one at a time with concrete examples.\n\
         \n\
         [{summary_at}] Summary (30 seconds)\n\
         Recap the key points and invite viewers to like, comment and subscribe.\n"
    )
}

/// Calls a generation backend under a retry policy.
#[derive(Clone)]
pub struct GenerationClient {
    backend: Arc<dyn GenerationBackend>,
    policy: RetryPolicy,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn GenerationBackend>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Call the backend, retrying quota errors only.
    ///
    /// Exhausted quota retries surface as [`GenerationError::QuotaExhausted`].
    pub async fn try_generate(&self, prompt: &str, config: &GenerationConfig) -> GenerationOutcome {
        let backend: &dyn GenerationBackend = self.backend.as_ref();
        let result = retry_async(&self.policy, move |attempt| {
            info!(attempt, "Calling generation backend");
            backend.generate(prompt, config)
        })
        .await;

        match result {
            RetryResult::Success { value, attempts } => GenerationOutcome {
                result: Ok(value),
                attempts,
            },
            RetryResult::Failed {
                error,
                attempts,
                exhausted,
            } => {
                let error = if exhausted && error.is_quota() {
                    GenerationError::QuotaExhausted {
                        attempts: attempts.len() as u32,
                    }
                } else {
                    error
                };
                GenerationOutcome {
                    result: Err(error),
                    attempts,
                }
            }
        }
    }

    /// Generate a script, degrading instead of failing.
    ///
    /// Non-quota errors become a formatted error message. Exhausted quota
    /// retries become [`fallback_script`].
    pub async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
        duration_minutes: u32,
    ) -> GeneratedScript {
        let outcome = self.try_generate(prompt, config).await;
        degrade(outcome, ScriptKind::Generated, duration_minutes)
    }
}

/// Map a generation outcome onto final script text.
pub(crate) fn degrade(
    outcome: GenerationOutcome,
    success_kind: ScriptKind,
    duration_minutes: u32,
) -> GeneratedScript {
    let GenerationOutcome { result, attempts } = outcome;
    match result {
        Ok(text) if !text.trim().is_empty() => GeneratedScript {
            text,
            kind: success_kind,
            attempts,
        },
        Ok(_) => {
            warn!("Generation returned empty text, using template");
            metrics::record_fallback("template");
            GeneratedScript {
                text: fallback_script(duration_minutes),
                kind: ScriptKind::Template,
                attempts,
            }
        }
        Err(e) if e.is_quota() => {
            warn!(error = %e, "Generation quota exhausted, using template");
            metrics::record_fallback("template");
            GeneratedScript {
                text: fallback_script(duration_minutes),
                kind: ScriptKind::Template,
                attempts,
            }
        }
        Err(e) => {
            warn!(error = %e, "Generation failed");
            metrics::record_fallback("error_message");
            GeneratedScript {
                text: error_message(&e),
                kind: ScriptKind::ErrorMessage,
                attempts,
            }
        }
    }
}
