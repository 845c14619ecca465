// Shared types for the preprocessing pipeline
use crate::redaction::PlaceholderMap;
use serde::{Deserialize, Serialize};

/// Body divided into the new message and the quoted history below it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSplitResult {
    /// Text before the separator (the whole body when no thread is found)
    pub current_message: String,
    /// Text after the separator, empty without a thread
    pub thread_content: String,
    /// Whether any separator matched
    pub has_thread: bool,
    /// Name of the separator rule that matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

impl ThreadSplitResult {
    /// The whole body as the current message
    pub fn single(text: &str) -> Self {
        Self {
            current_message: text.trim().to_string(),
            ..Default::default()
        }
    }
}

/// Output of one `process_email_for_llm` call
///
/// Carries the placeholder mapping needed to restore the model's reply, so a
/// saved result is enough to run the restore step later.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreprocessingResult {
    /// Redacted, possibly summarized text to hand to the LLM
    pub final_text: String,
    /// Mapping produced while redacting this email
    pub placeholders: PlaceholderMap,
    /// Size of current message + thread before any summarization
    pub initial_token_count: usize,
    /// Size of `final_text`
    pub final_llm_input_token_count: usize,
    /// Detected (or fallback) language code
    pub detected_language: String,
    /// Detector confidence, `None` when the fallback code was used
    #[serde(default)]
    pub language_confidence: Option<f64>,
    pub has_thread: bool,
    pub thread_summary_applied: bool,
    /// Redacted split the final text was assembled from
    pub split: ThreadSplitResult,
    /// Whether the raw body was cut to the configured character bound
    #[serde(default)]
    pub input_truncated: bool,
}

impl PreprocessingResult {
    /// Replace placeholders in `generated_text` using this result's mapping
    pub fn restore(&self, generated_text: &str) -> String {
        self.placeholders.restore(generated_text)
    }
}
