//! Draft prompt assembly
//!
//! Fills the configured template with a preprocessed email and works out how
//! many tokens are left for the model's reply. Calling the model is left to
//! the caller.

use crate::config::{Config, CLASSIFICATION_SLOT, EMAIL_CONTENT_SLOT};
use crate::preprocess::PreprocessingResult;
use crate::tokenizer::TokenCounter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything needed to ask the drafting model for a reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRequest {
    pub prompt: String,
    pub classification: String,
    pub prompt_tokens: usize,
    pub max_tokens_to_generate: usize,
}

/// Builds [`DraftRequest`]s from preprocessing results
pub struct DraftPromptBuilder {
    template: String,
    default_classification: String,
    max_main_llm_tokens: usize,
    min_generation_tokens: usize,
    counter: Arc<dyn TokenCounter>,
}

impl DraftPromptBuilder {
    pub fn new(config: &Config, counter: Arc<dyn TokenCounter>) -> Self {
        Self {
            template: config.prompt.template.clone(),
            default_classification: config.prompt.default_classification.clone(),
            max_main_llm_tokens: config.limits.max_main_llm_tokens,
            min_generation_tokens: config.limits.min_generation_tokens,
            counter,
        }
    }

    /// Fill the template and budget the reply
    ///
    /// The reply gets whatever the prompt leaves of `max_main_llm_tokens`,
    /// but never less than `min_generation_tokens`.
    pub fn build(
        &self,
        result: &PreprocessingResult,
        classification: Option<&str>,
    ) -> DraftRequest {
        let classification = classification
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(&self.default_classification);

        let prompt = self.render(&result.final_text, classification);
        let prompt_tokens = self.counter.count_tokens(&prompt);
        let max_tokens_to_generate = self
            .max_main_llm_tokens
            .saturating_sub(prompt_tokens)
            .max(self.min_generation_tokens);

        tracing::debug!(
            "Draft prompt uses {} tokens, {} left for generation",
            prompt_tokens,
            max_tokens_to_generate
        );

        DraftRequest {
            prompt,
            classification: classification.to_string(),
            prompt_tokens,
            max_tokens_to_generate,
        }
    }

    // Slots inside the email text itself are left alone
    fn render(&self, email_content: &str, classification: &str) -> String {
        self.template
            .split(EMAIL_CONTENT_SLOT)
            .map(|part| part.replace(CLASSIFICATION_SLOT, classification))
            .collect::<Vec<_>>()
            .join(email_content)
    }
}
