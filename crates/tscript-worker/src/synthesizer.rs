//! Two-tier script synthesis.
//!
//! Tier 1 sends the primary prompt. If its quota retries run out, tier 2
//! sends the shorter fallback prompt with a lower output ceiling. If that is
//! exhausted too, the static template is returned.

use tracing::{info, warn};

use crate::generation::{
    degrade, GeneratedScript, GenerationClient, GenerationConfig, GenerationError,
    GenerationOutcome, ScriptKind,
};
use crate::metrics;
use crate::prompt::{build_fallback_prompt, build_prompt, PromptBudget, SourceTranscript};

/// Builds prompts from transcripts and turns them into a script.
#[derive(Clone)]
pub struct ScriptSynthesizer {
    client: GenerationClient,
    language: String,
    base_config: GenerationConfig,
}

impl ScriptSynthesizer {
    pub fn new(client: GenerationClient, language: impl Into<String>) -> Self {
        Self {
            client,
            language: language.into(),
            base_config: GenerationConfig::default(),
        }
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.base_config = config;
        self
    }

    /// Produce a script for a video of `duration_minutes`. Never empty.
    pub async fn synthesize(
        &self,
        sources: &[SourceTranscript],
        duration_minutes: u32,
    ) -> GeneratedScript {
        let budget = PromptBudget::new(duration_minutes);

        let prompt = build_prompt(sources, &budget, &self.language);
        let config = self
            .base_config
            .clone()
            .with_max_output_tokens(budget.max_output_tokens);
        info!(
            sources = sources.len(),
            prompt_words = prompt.split_whitespace().count(),
            "Generating script"
        );

        let primary = self.client.try_generate(&prompt, &config).await;
        record_tier("primary", &primary);

        let exhausted = matches!(
            primary.result,
            Err(GenerationError::QuotaExhausted { .. })
        );
        if !exhausted {
            return degrade(primary, ScriptKind::Generated, duration_minutes);
        }

        warn!("Quota exhausted on primary prompt, retrying with fallback prompt");
        metrics::record_fallback("fallback_prompt");

        let prompt = build_fallback_prompt(sources, &budget, &self.language);
        let config = self
            .base_config
            .clone()
            .with_max_output_tokens(budget.fallback_max_output_tokens);

        let mut fallback = self.client.try_generate(&prompt, &config).await;
        record_tier("fallback", &fallback);

        let mut attempts = primary.attempts;
        attempts.append(&mut fallback.attempts);
        degrade(
            GenerationOutcome {
                result: fallback.result,
                attempts,
            },
            ScriptKind::GeneratedFromFallbackPrompt,
            duration_minutes,
        )
    }
}

fn record_tier(tier: &'static str, outcome: &GenerationOutcome) {
    let result = match &outcome.result {
        Ok(_) => "success",
        Err(GenerationError::QuotaExhausted { .. }) => "quota_exhausted",
        Err(_) => "failed",
    };
    metrics::record_generation(tier, result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::GenerationBackend;
    use crate::generation::fallback_script;
    use crate::retry::RetryPolicy;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Fails with quota errors while the output ceiling is above `quota_above`.
    struct TieredBackend {
        quota_above: u32,
        prompts: Mutex<Vec<(String, u32)>>,
    }

    impl TieredBackend {
        fn new(quota_above: u32) -> Arc<Self> {
            Arc::new(Self {
                quota_above,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl GenerationBackend for TieredBackend {
        async fn generate(
            &self,
            prompt: &str,
            config: &GenerationConfig,
        ) -> Result<String, GenerationError> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), config.max_output_tokens));
            if config.max_output_tokens > self.quota_above {
                Err(GenerationError::Quota("RESOURCE_EXHAUSTED".to_string()))
            } else {
                Ok(format!("script at {} tokens", config.max_output_tokens))
            }
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl GenerationBackend for FailingBackend {
        async fn generate(
            &self,
            _prompt: &str,
            _config: &GenerationConfig,
        ) -> Result<String, GenerationError> {
            Err(GenerationError::failed("API key not valid"))
        }
    }

    fn synthesizer(backend: Arc<dyn GenerationBackend>) -> ScriptSynthesizer {
        ScriptSynthesizer::new(
            GenerationClient::new(backend, RetryPolicy::new("test")),
            "Japanese",
        )
    }

    fn sources() -> Vec<SourceTranscript> {
        vec![
            SourceTranscript::new("First", "alpha beta gamma"),
            SourceTranscript::new("Second", "delta epsilon"),
        ]
    }

    #[tokio::test]
    async fn test_primary_tier_success() {
        let backend = TieredBackend::new(u32::MAX);
        let script = synthesizer(backend.clone()).synthesize(&sources(), 5).await;

        assert_eq!(script.kind, ScriptKind::Generated);
        assert_eq!(script.text, "script at 8192 tokens");
        assert_eq!(script.attempts.len(), 1);

        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts[0].0.contains("Video 2: Second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_falls_back_to_shorter_prompt() {
        let backend = TieredBackend::new(2000);
        let script = synthesizer(backend.clone()).synthesize(&sources(), 5).await;

        assert_eq!(script.kind, ScriptKind::GeneratedFromFallbackPrompt);
        assert_eq!(script.text, "script at 2000 tokens");
        assert_eq!(script.attempts.len(), 6);

        let prompts = backend.prompts.lock().unwrap();
        let (primary, _) = &prompts[0];
        let (fallback, tokens) = &prompts[5];
        assert_eq!(*tokens, 2000);
        assert!(fallback.len() < primary.len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_tiers_exhausted_returns_template() {
        let backend = TieredBackend::new(0);
        let script = synthesizer(backend.clone()).synthesize(&sources(), 3).await;

        assert_eq!(script.kind, ScriptKind::Template);
        assert_eq!(script.text, fallback_script(3));
        assert!(script.text.contains("2 minutes"));
        assert_eq!(script.attempts.len(), 10);
    }

    #[tokio::test]
    async fn test_non_quota_failure_skips_fallback_tier() {
        let script = synthesizer(Arc::new(FailingBackend))
            .synthesize(&sources(), 3)
            .await;

        assert_eq!(script.kind, ScriptKind::ErrorMessage);
        assert_eq!(script.text, "Script generation error: API key not valid");
        assert_eq!(script.attempts.len(), 1);
    }
}
