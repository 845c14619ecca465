//! Reversible redaction of sensitive substrings
//!
//! Sensitive spans (identifiers, email addresses, phone numbers) are swapped
//! for `[PH_XXXXXXXX]` tags before text reaches the LLM and swapped back in the
//! model's output. The mapping lives in a [`RedactionSession`] that is created
//! for a single preprocessing call and handed back to the caller with the
//! result, so nothing leaks between unrelated emails.

use crate::patterns::{PatternRegistry, SensitiveClass};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Matches any tag this module can emit
const PLACEHOLDER_PATTERN: &str = r"\[PH_[0-9A-F]{8}\]";

/// Redaction order; earlier classes hide their spans from later ones
const CLASS_PRIORITY: [SensitiveClass; 3] = [
    SensitiveClass::Identifier,
    SensitiveClass::Email,
    SensitiveClass::Phone,
];

/// Bidirectional original <-> placeholder mapping for one call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderMap {
    /// original text -> placeholder
    pub forward: HashMap<String, String>,
    /// placeholder -> original text
    pub reverse: HashMap<String, String>,
}

impl PlaceholderMap {
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Put the originals back into `text`
    pub fn restore(&self, text: &str) -> String {
        restore_original_keywords(text, &self.reverse)
    }
}

/// Mutable redaction state scoped to one preprocessing call
#[derive(Debug, Default)]
pub struct RedactionSession {
    map: PlaceholderMap,
}

impl RedactionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder for `original`, minting a new one on first sight
    ///
    /// `haystack` is the text being redacted; a freshly generated tag that
    /// already occurs there is discarded so restore can never touch organic
    /// text.
    pub fn placeholder_for(&mut self, original: &str, haystack: &str) -> String {
        if let Some(existing) = self.map.forward.get(original) {
            return existing.clone();
        }

        let placeholder = loop {
            let candidate = new_placeholder();
            if !self.map.reverse.contains_key(&candidate) && !haystack.contains(&candidate) {
                break candidate;
            }
        };

        self.map
            .forward
            .insert(original.to_string(), placeholder.clone());
        self.map
            .reverse
            .insert(placeholder.clone(), original.to_string());

        placeholder
    }

    /// Number of distinct originals redacted so far
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn map(&self) -> &PlaceholderMap {
        &self.map
    }

    /// End the session and hand the mapping to the caller
    pub fn into_map(self) -> PlaceholderMap {
        self.map
    }
}

fn new_placeholder() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("[PH_{}]", hex[..8].to_uppercase())
}

/// Output of a standalone redaction
#[derive(Debug, Clone)]
pub struct Redacted {
    pub text: String,
    pub placeholders: PlaceholderMap,
}

/// Applies the registry's redaction rules in class priority order
pub struct Redactor {
    patterns: Arc<PatternRegistry>,
}

impl Redactor {
    pub fn new(patterns: Arc<PatternRegistry>) -> Self {
        Self { patterns }
    }

    /// Redact `text` with a fresh session
    pub fn redact(&self, text: &str) -> Redacted {
        let mut session = RedactionSession::new();
        let text = self.redact_with(text, &mut session);
        Redacted {
            text,
            placeholders: session.into_map(),
        }
    }

    /// Redact `text`, recording placeholders in `session`
    pub fn redact_with(&self, text: &str, session: &mut RedactionSession) -> String {
        let mut result = text.to_string();

        for class in CLASS_PRIORITY {
            for rule in self.patterns.redaction_rules(class) {
                if !rule.regex.is_match(&result) {
                    continue;
                }

                let before = session.len();
                let haystack = result.clone();
                result = rule
                    .regex
                    .replace_all(&haystack, |caps: &Captures| {
                        session.placeholder_for(&caps[0], &haystack)
                    })
                    .into_owned();

                tracing::debug!(
                    "Rule {} ({}) added {} placeholder(s)",
                    rule.name,
                    class.as_str(),
                    session.len() - before
                );
            }
        }

        result
    }
}

/// Replace every known placeholder in `generated_text` with its original
///
/// Placeholders missing from `reverse_map` (for instance ones the model made
/// up) are left untouched.
pub fn restore_original_keywords(
    generated_text: &str,
    reverse_map: &HashMap<String, String>,
) -> String {
    if reverse_map.is_empty() {
        return generated_text.to_string();
    }

    placeholder_regex()
        .replace_all(generated_text, |caps: &Captures| {
            reverse_map
                .get(&caps[0])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER_RE.get_or_init(|| {
        Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is valid")
    })
}
