//! # Synthesis Skill
//!
//! Produces the final synthesis over accumulated findings. There is no
//! degraded mode here: a generation failure is fatal to the pipeline and
//! propagates to the caller.

use crate::models::LanguageModel;
use crate::skills::{prompts, StepOutcome};

/// Findings synthesizer
pub struct SynthesisSkill;

impl SynthesisSkill {
    /// Synthesize the accumulated findings into an answer for the query
    pub async fn run(
        llm: &dyn LanguageModel,
        query: &str,
        context: &str,
    ) -> anyhow::Result<StepOutcome> {
        tracing::info!("synthesizing findings");

        let content = llm
            .generate_with_system(
                prompts::MEDICAL_RESEARCHER,
                &prompts::synthesis_prompt(query, context),
            )
            .await?;

        Ok(StepOutcome::text(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FailingLlm;

    #[async_trait]
    impl LanguageModel for FailingLlm {
        async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
            anyhow::bail!("rate limited")
        }
    }

    struct FixedLlm;

    #[async_trait]
    impl LanguageModel for FixedLlm {
        async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
            Ok("The evidence supports the intervention.".to_string())
        }
    }

    #[tokio::test]
    async fn test_synthesis_returns_model_output() {
        let outcome = SynthesisSkill::run(&FixedLlm, "query", "findings")
            .await
            .unwrap();
        assert_eq!(outcome.content, "The evidence supports the intervention.");
    }

    #[tokio::test]
    async fn test_synthesis_failure_propagates() {
        assert!(SynthesisSkill::run(&FailingLlm, "query", "findings")
            .await
            .is_err());
    }
}
