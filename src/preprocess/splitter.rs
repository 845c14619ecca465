// Current message / quoted thread separation
use super::types::ThreadSplitResult;
use crate::patterns::PatternRegistry;
use std::sync::Arc;

/// Splits a body at the highest-priority thread separator
///
/// Separators are tried in table order; the first rule with a usable match
/// decides the split, regardless of where other rules would match. A match
/// with nothing but whitespace in front of it is skipped so the current
/// message is never empty for a non-blank body.
pub struct ThreadSplitter {
    patterns: Arc<PatternRegistry>,
}

impl ThreadSplitter {
    pub fn new(patterns: Arc<PatternRegistry>) -> Self {
        Self { patterns }
    }

    pub fn split(&self, text: &str) -> ThreadSplitResult {
        for separator in &self.patterns.thread_separators {
            let found = separator
                .regex
                .find_iter(text)
                .find(|m| !text[..m.start()].trim().is_empty());

            if let Some(m) = found {
                tracing::debug!(
                    "Thread separator {} matched at byte {}",
                    separator.name,
                    m.start()
                );

                return ThreadSplitResult {
                    current_message: text[..m.start()].trim().to_string(),
                    thread_content: text[m.end()..].trim().to_string(),
                    has_thread: true,
                    separator: Some(separator.name.clone()),
                };
            }
        }

        ThreadSplitResult::single(text)
    }
}
