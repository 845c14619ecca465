// Statistical (extractive) thread summarizer
//
// Scores each sentence by the corpus frequency of its content words, then
// greedily keeps the best sentences that fit a token budget and re-emits them
// in reading order. No model call is involved.

mod sentences;
mod tokens;

pub use sentences::SentenceSplitter;
pub use tokens::{ContentTokenizer, StopwordTokenizer};

use crate::config::SummarizerConfig;
use crate::error::Result;
use crate::tokenizer::TokenCounter;
use ahash::{HashMap, HashMapExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What to do when the next-ranked sentence does not fit the budget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Stop scanning at the first sentence that overflows
    #[default]
    StopAtOverflow,
    /// Skip the overflowing sentence and keep trying lower-ranked ones
    SkipOverflow,
}

/// Score of one sentence, by original position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SentenceScore {
    pub index: usize,
    pub score: u64,
}

/// Summary with the bookkeeping behind it
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    /// Selected sentences in reading order
    pub text: String,
    /// Sentences found in the input
    pub sentence_count: usize,
    /// Indices of the selected sentences, ascending
    pub selected: Vec<usize>,
    /// Per-sentence scores in original order
    pub scores: Vec<SentenceScore>,
    /// Whether the joined selection had to be cut to fit
    pub truncated: bool,
}

/// Frequency-scoring extractive summarizer
pub struct StatisticalSummarizer {
    counter: Arc<dyn TokenCounter>,
    tokenizer: Box<dyn ContentTokenizer>,
    splitter: SentenceSplitter,
    selection: SelectionStrategy,
    ellipsis: String,
}

impl StatisticalSummarizer {
    /// Summarizer with default selection and ellipsis
    pub fn new(
        counter: Arc<dyn TokenCounter>,
        tokenizer: Box<dyn ContentTokenizer>,
    ) -> Result<Self> {
        Ok(Self {
            counter,
            tokenizer,
            splitter: SentenceSplitter::new()?,
            selection: SelectionStrategy::default(),
            ellipsis: "...".to_string(),
        })
    }

    /// Summarizer configured from the `[summarizer]` section
    pub fn from_config(config: &SummarizerConfig, counter: Arc<dyn TokenCounter>) -> Result<Self> {
        let tokenizer = StopwordTokenizer::new(&config.stopword_language, config.min_token_chars)?;

        Ok(Self::new(counter, Box::new(tokenizer))?
            .with_selection(config.selection)
            .with_ellipsis(config.ellipsis.clone()))
    }

    pub fn with_selection(mut self, selection: SelectionStrategy) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_ellipsis(mut self, ellipsis: impl Into<String>) -> Self {
        self.ellipsis = ellipsis.into();
        self
    }

    /// Summarize `thread_text` into at most `max_tokens` tokens
    ///
    /// Returns an empty string when the input has no sentences.
    pub fn summarize(&self, thread_text: &str, max_tokens: usize) -> String {
        self.summarize_detailed(thread_text, max_tokens).text
    }

    /// Like [`summarize`](Self::summarize), keeping scores and selection
    pub fn summarize_detailed(&self, thread_text: &str, max_tokens: usize) -> Summary {
        let sentences = self.splitter.split(thread_text);
        if sentences.is_empty() {
            return Summary::default();
        }

        let scores = self.score_sentences(&sentences);
        let selected = self.select(&sentences, &scores, max_tokens);

        let joined = selected
            .iter()
            .map(|&i| sentences[i].as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let (text, truncated) = if self.counter.count_tokens(&joined) > max_tokens {
            (self.truncate_with_ellipsis(&joined, max_tokens), true)
        } else {
            (joined, false)
        };

        tracing::debug!(
            "Selected {}/{} sentences within {} tokens (truncated: {})",
            selected.len(),
            sentences.len(),
            max_tokens,
            truncated
        );

        Summary {
            text: text.trim().to_string(),
            sentence_count: sentences.len(),
            selected,
            scores,
            truncated,
        }
    }

    /// Score = sum of each content token's frequency across all sentences
    ///
    /// Computed fresh on every call.
    pub fn score_sentences(&self, sentences: &[String]) -> Vec<SentenceScore> {
        let tokens: Vec<Vec<String>> = sentences
            .iter()
            .map(|s| self.tokenizer.content_tokens(s))
            .collect();

        let mut frequencies: HashMap<&str, u64> = HashMap::new();
        for token in tokens.iter().flatten() {
            *frequencies.entry(token.as_str()).or_insert(0) += 1;
        }

        tokens
            .iter()
            .enumerate()
            .map(|(index, sentence_tokens)| SentenceScore {
                index,
                score: sentence_tokens
                    .iter()
                    .map(|t| frequencies.get(t.as_str()).copied().unwrap_or(0))
                    .sum(),
            })
            .collect()
    }

    /// Greedy budgeted selection; returns indices in reading order
    fn select(
        &self,
        sentences: &[String],
        scores: &[SentenceScore],
        max_tokens: usize,
    ) -> Vec<usize> {
        // Highest score first, ties keep reading order
        let mut ranked = scores.to_vec();
        ranked.sort_by(|a, b| b.score.cmp(&a.score).then(a.index.cmp(&b.index)));

        let mut selected = Vec::new();
        let mut used = 0;

        for candidate in &ranked {
            let cost = self.counter.count_tokens(&sentences[candidate.index]);
            if used + cost <= max_tokens {
                selected.push(candidate.index);
                used += cost;
                continue;
            }

            match self.selection {
                SelectionStrategy::StopAtOverflow => break,
                SelectionStrategy::SkipOverflow => continue,
            }
        }

        selected.sort_unstable();
        selected
    }

    fn truncate_with_ellipsis(&self, text: &str, max_tokens: usize) -> String {
        let mut budget = max_tokens.saturating_sub(self.counter.count_tokens(&self.ellipsis));

        loop {
            let cut = self.counter.truncate_to_tokens(text, budget);
            let candidate = format!("{}{}", cut.trim_end(), self.ellipsis);
            if self.counter.count_tokens(&candidate) <= max_tokens {
                return candidate;
            }
            if budget == 0 {
                // Not even the ellipsis fits
                return String::new();
            }
            budget -= 1;
        }
    }
}
