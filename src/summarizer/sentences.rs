// Sentence segmentation for extractive summarization
use crate::error::{MailprepError, Result};
use regex::Regex;

/// Sentence-final punctuation followed by whitespace
const SENTENCE_BOUNDARY: &str = r"[.?!]\s+";

/// Splits text on sentence-final punctuation
///
/// The punctuation stays with the sentence it ends; the whitespace after it is
/// consumed. Empty fragments are dropped.
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    boundary: Regex,
}

impl SentenceSplitter {
    pub fn new() -> Result<Self> {
        let boundary =
            Regex::new(SENTENCE_BOUNDARY).map_err(|e| MailprepError::InvalidPattern {
                name: "sentence_boundary".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { boundary })
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;

        for m in self.boundary.find_iter(text) {
            // Boundary punctuation is a single ASCII byte
            push_fragment(&mut sentences, &text[start..m.start() + 1]);
            start = m.end();
        }
        push_fragment(&mut sentences, &text[start..]);

        sentences
    }
}

fn push_fragment(sentences: &mut Vec<String>, fragment: &str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        sentences.push(fragment.to_string());
    }
}
