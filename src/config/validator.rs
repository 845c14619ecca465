use crate::config::{Config, CLASSIFICATION_SLOT, EMAIL_CONTENT_SLOT, SCHEMA_VERSION};
use crate::error::{MailprepError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, reporting every violation at once
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_tokenizer(config, &mut errors);
        Self::validate_limits(config, &mut errors);
        Self::validate_summarizer(config, &mut errors);
        Self::validate_language(config, &mut errors);
        Self::validate_labels(config, &mut errors);
        Self::validate_prompt(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(MailprepError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != SCHEMA_VERSION {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_tokenizer(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.tokenizer.model.trim().is_empty() {
            errors.push(ValidationError::new(
                "tokenizer.model",
                "Model name cannot be empty",
            ));
        }
    }

    fn validate_limits(config: &Config, errors: &mut Vec<ValidationError>) {
        let limits = &config.limits;

        if limits.max_main_llm_tokens == 0 {
            errors.push(ValidationError::new(
                "limits.max_main_llm_tokens",
                "Main LLM token budget must be greater than 0",
            ));
        }

        if limits.max_summary_tokens == 0 {
            errors.push(ValidationError::new(
                "limits.max_summary_tokens",
                "Summary token budget must be greater than 0",
            ));
        }

        if limits.pivot_token_limit == 0 {
            errors.push(ValidationError::new(
                "limits.pivot_token_limit",
                "Pivot token limit must be greater than 0",
            ));
        }

        if limits.max_summary_tokens >= limits.max_main_llm_tokens {
            errors.push(ValidationError::new(
                "limits.max_summary_tokens",
                format!(
                    "Summary budget ({}) must be smaller than the main LLM budget ({})",
                    limits.max_summary_tokens, limits.max_main_llm_tokens
                ),
            ));
        }

        if limits.min_generation_tokens >= limits.max_main_llm_tokens {
            errors.push(ValidationError::new(
                "limits.min_generation_tokens",
                "Minimum generation budget must be smaller than the main LLM budget",
            ));
        }

        if limits.max_body_chars == 0 {
            errors.push(ValidationError::new(
                "limits.max_body_chars",
                "Body size bound must be greater than 0",
            ));
        }
    }

    fn validate_summarizer(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.summarizer.min_token_chars == 0 {
            errors.push(ValidationError::new(
                "summarizer.min_token_chars",
                "Minimum token length must be at least 1",
            ));
        }

        if config.summarizer.stopword_language.trim().is_empty() {
            errors.push(ValidationError::new(
                "summarizer.stopword_language",
                "Stopword language cannot be empty",
            ));
        }
    }

    fn validate_language(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.language.fallback.trim().is_empty() {
            errors.push(ValidationError::new(
                "language.fallback",
                "Fallback language code cannot be empty",
            ));
        }

        let confidence = config.language.min_confidence;
        if !(0.0..=1.0).contains(&confidence) {
            errors.push(ValidationError::new(
                "language.min_confidence",
                format!(
                    "Minimum confidence must be between 0.0 and 1.0, got {}",
                    confidence
                ),
            ));
        }
    }

    fn validate_labels(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.labels.thread.trim().is_empty() {
            errors.push(ValidationError::new(
                "labels.thread",
                "Thread separator label cannot be empty",
            ));
        }

        if config.labels.summary.trim().is_empty() {
            errors.push(ValidationError::new(
                "labels.summary",
                "Summary separator label cannot be empty",
            ));
        }
    }

    fn validate_prompt(config: &Config, errors: &mut Vec<ValidationError>) {
        let template = &config.prompt.template;
        if !template.contains(EMAIL_CONTENT_SLOT) {
            errors.push(ValidationError::new(
                "prompt.template",
                format!("Template must contain {}", EMAIL_CONTENT_SLOT),
            ));
        }

        if !template.contains(CLASSIFICATION_SLOT) {
            tracing::debug!("Prompt template does not use {}", CLASSIFICATION_SLOT);
        }
    }
}
