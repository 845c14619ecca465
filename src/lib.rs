//! Mailprep - email preprocessing for LLM reply drafting
//!
//! Takes a raw (possibly multi-message) customer email, strips boilerplate,
//! hides personal data behind reversible placeholders, separates the new
//! message from the quoted thread and, when the whole thing is over a token
//! pivot, replaces the thread with an extractive summary. The placeholder map
//! travels with the result so the model's reply can be restored afterwards.

pub mod cli;
pub mod config;
pub mod error;
pub mod language;
pub mod patterns;
pub mod preprocess;
pub mod prompt;
pub mod redaction;
pub mod summarizer;
pub mod tokenizer;

pub use error::{MailprepError, Result};
pub use preprocess::{EmailPreprocessor, PreprocessingResult, ThreadSplitResult};
pub use redaction::restore_original_keywords;
