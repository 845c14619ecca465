//! Token counting bound to a specific LLM model
//!
//! Everything in the pipeline that talks about "size" talks in the drafting
//! model's own token units, so the counter is chosen once from the model name
//! and shared by the orchestrator and the summarizer.

use crate::error::{MailprepError, Result};
use tiktoken_rs::CoreBPE;

/// Measures and trims text in model-native token units
pub trait TokenCounter: Send + Sync {
    /// Model identifier this counter is bound to
    fn model(&self) -> &str;

    /// Number of tokens in `text`
    fn count_tokens(&self, text: &str) -> usize;

    /// Longest prefix of `text` that fits in `max_tokens`
    fn truncate_to_tokens(&self, text: &str, max_tokens: usize) -> String;
}

/// BPE counter for OpenAI models
pub struct TiktokenCounter {
    model: String,
    bpe: CoreBPE,
}

impl TiktokenCounter {
    /// Bind a counter to `model`
    ///
    /// Fails for model names tiktoken does not know; callers are expected to
    /// surface this at startup.
    pub fn for_model(model: &str) -> Result<Self> {
        let bpe =
            tiktoken_rs::get_bpe_from_model(model).map_err(|e| MailprepError::UnsupportedModel {
                model: model.to_string(),
                source: e,
            })?;

        tracing::debug!("Loaded tokenizer for model {}", model);

        Ok(Self {
            model: model.to_string(),
            bpe,
        })
    }
}

impl TokenCounter for TiktokenCounter {
    fn model(&self) -> &str {
        &self.model
    }

    fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    fn truncate_to_tokens(&self, text: &str, max_tokens: usize) -> String {
        let tokens = self.bpe.encode_ordinary(text);
        if tokens.len() <= max_tokens {
            return text.to_string();
        }

        // A cut can land inside a multi-byte character; back off until the
        // prefix decodes cleanly.
        let mut end = max_tokens;
        while end > 0 {
            if let Ok(prefix) = self.bpe.decode(tokens[..end].to_vec()) {
                return prefix;
            }
            end -= 1;
        }
        String::new()
    }
}

impl std::fmt::Debug for TiktokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiktokenCounter")
            .field("model", &self.model)
            .finish()
    }
}
