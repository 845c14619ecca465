// Email preprocessing pipeline
//
// Stage 1: Boilerplate stripping (signatures, footers, blank-line runs)
// Stage 2: Redaction of identifiers, emails and phone numbers
// Stage 3: Current message / quoted thread split
// Stage 4: Pivot gate and extractive thread summary
// Stage 5: Final token count and language detection

mod boilerplate;
mod splitter;
mod types;

pub use boilerplate::BoilerplateStripper;
pub use splitter::ThreadSplitter;
pub use types::{PreprocessingResult, ThreadSplitResult};

use crate::config::{Config, ConfigValidator, LabelsConfig, LanguageConfig, LimitsConfig};
use crate::error::Result;
use crate::language::{self, FallbackDetector, LanguageDetector, WhatlangDetector};
use crate::patterns::PatternRegistry;
use crate::prompt::{DraftPromptBuilder, DraftRequest};
use crate::redaction::{self, RedactionSession, Redactor};
use crate::summarizer::StatisticalSummarizer;
use crate::tokenizer::{TiktokenCounter, TokenCounter};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Main preprocessing orchestrator
///
/// Everything here is built once and read-only afterwards; the only mutable
/// state of a call (the placeholder mapping) lives in a [`RedactionSession`]
/// created inside [`process_email_for_llm`](Self::process_email_for_llm), so
/// one instance can serve concurrent callers.
pub struct EmailPreprocessor {
    limits: LimitsConfig,
    labels: LabelsConfig,
    language: LanguageConfig,
    stripper: BoilerplateStripper,
    redactor: Redactor,
    splitter: ThreadSplitter,
    summarizer: StatisticalSummarizer,
    counter: Arc<dyn TokenCounter>,
    detector: Box<dyn LanguageDetector>,
    prompt: DraftPromptBuilder,
}

impl EmailPreprocessor {
    /// Build the pipeline described by `config`
    ///
    /// Fails if the configuration is invalid, a pattern does not compile, or
    /// the tokenizer model is unknown.
    pub fn new(config: &Config) -> Result<Self> {
        ConfigValidator::validate(config)?;

        let patterns = match &config.patterns.file {
            Some(path) => {
                tracing::info!("Loading pattern tables from {:?}", path);
                PatternRegistry::from_config_file(path)?
            }
            None => PatternRegistry::builtin()?,
        };

        let counter = TiktokenCounter::for_model(&config.tokenizer.model)?;

        let detector: Box<dyn LanguageDetector> = if config.language.detect {
            Box::new(WhatlangDetector)
        } else {
            Box::new(FallbackDetector)
        };

        Self::from_parts(config, Arc::new(patterns), Arc::new(counter), detector)
    }

    /// Build the pipeline from explicit collaborators
    pub fn from_parts(
        config: &Config,
        patterns: Arc<PatternRegistry>,
        counter: Arc<dyn TokenCounter>,
        detector: Box<dyn LanguageDetector>,
    ) -> Result<Self> {
        let summarizer = StatisticalSummarizer::from_config(&config.summarizer, counter.clone())?;

        tracing::debug!(
            "Preprocessor ready (model: {}, detector: {}, pivot: {})",
            counter.model(),
            detector.name(),
            config.limits.pivot_token_limit
        );

        Ok(Self {
            limits: config.limits.clone(),
            labels: config.labels.clone(),
            language: config.language.clone(),
            stripper: BoilerplateStripper::new(patterns.clone())?,
            redactor: Redactor::new(patterns.clone()),
            splitter: ThreadSplitter::new(patterns),
            summarizer,
            prompt: DraftPromptBuilder::new(config, counter.clone()),
            counter,
            detector,
        })
    }

    /// Turn a raw email body into bounded, redacted LLM input
    pub fn process_email_for_llm(&self, raw_body: &str) -> PreprocessingResult {
        let start = Instant::now();

        let (body, input_truncated) = self.bound_input(raw_body);

        // Stage 1: strip boilerplate
        let stripped = self.stripper.strip(body);

        // Stage 2: redact the whole body, quoted thread included
        let mut session = RedactionSession::new();
        let redacted = self.redactor.redact_with(&stripped, &mut session);
        tracing::debug!("Replaced {} sensitive value(s)", session.len());

        // Stage 3: split
        let split = self.splitter.split(&redacted);

        // Stage 4: pivot gate
        let full_text = self.join(
            &split.current_message,
            &self.labels.thread,
            &split.thread_content,
        );
        let initial_token_count = self.counter.count_tokens(&full_text);
        tracing::debug!(
            "Pre-summary size {} tokens (pivot {})",
            initial_token_count,
            self.limits.pivot_token_limit
        );

        let mut thread_summary_applied = false;
        let final_text = if split.has_thread && initial_token_count > self.limits.pivot_token_limit
        {
            let summary = self
                .summarizer
                .summarize(&split.thread_content, self.limits.max_summary_tokens);

            if summary.is_empty() {
                tracing::warn!("Thread summary came back empty, keeping the full thread");
                full_text
            } else {
                tracing::info!(
                    "Thread summarized: {} tokens over pivot {}",
                    initial_token_count,
                    self.limits.pivot_token_limit
                );
                thread_summary_applied = true;
                self.join(&split.current_message, &self.labels.summary, &summary)
            }
        } else {
            full_text
        };

        // Stage 5: measure and detect
        let final_llm_input_token_count = self.counter.count_tokens(&final_text);

        let (detected_language, language_confidence) = match language::confident_detection(
            self.detector.as_ref(),
            &final_text,
            self.language.min_confidence,
        ) {
            Some(detection) => (detection.code, Some(detection.confidence)),
            None => (self.language.fallback.clone(), None),
        };

        tracing::debug!(
            "Preprocessed email in {}ms: {} -> {} tokens, language {}",
            start.elapsed().as_millis(),
            initial_token_count,
            final_llm_input_token_count,
            detected_language
        );

        PreprocessingResult {
            final_text,
            placeholders: session.into_map(),
            initial_token_count,
            final_llm_input_token_count,
            detected_language,
            language_confidence,
            has_thread: split.has_thread,
            thread_summary_applied,
            split,
            input_truncated,
        }
    }

    /// Put the originals back into model output
    pub fn restore_original_keywords(
        &self,
        generated_text: &str,
        reverse_map: &HashMap<String, String>,
    ) -> String {
        redaction::restore_original_keywords(generated_text, reverse_map)
    }

    /// Draft prompt for `result`, with the generation budget worked out
    pub fn build_draft_request(
        &self,
        result: &PreprocessingResult,
        classification: Option<&str>,
    ) -> DraftRequest {
        self.prompt.build(result, classification)
    }

    /// Cut the body to `max_body_chars` before any regex sees it
    fn bound_input<'a>(&self, raw_body: &'a str) -> (&'a str, bool) {
        match raw_body.char_indices().nth(self.limits.max_body_chars) {
            Some((cut, _)) => {
                tracing::warn!(
                    "Email body longer than {} chars, truncating",
                    self.limits.max_body_chars
                );
                (&raw_body[..cut], true)
            }
            None => (raw_body, false),
        }
    }

    fn join(&self, current: &str, label: &str, older: &str) -> String {
        if older.is_empty() {
            current.to_string()
        } else {
            format!("{}\n\n{}\n{}", current, label, older)
        }
    }
}
