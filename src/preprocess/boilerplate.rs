// Boilerplate stripping (signatures, mobile footers, blank-line runs)
use crate::error::{MailprepError, Result};
use crate::patterns::PatternRegistry;
use regex::Regex;
use std::sync::Arc;

/// Two or more line breaks with only whitespace between them
const BLANK_RUN: &str = r"\n\s*\n";

/// Removes signature blocks and client footers
///
/// The body is cut into segments at every thread separator. Inside each
/// segment the earliest boilerplate match truncates the segment, so a
/// signature in the new message disappears while the quoted history below it
/// is kept. Separators are copied through verbatim.
pub struct BoilerplateStripper {
    patterns: Arc<PatternRegistry>,
    blank_run: Regex,
}

impl BoilerplateStripper {
    pub fn new(patterns: Arc<PatternRegistry>) -> Result<Self> {
        let blank_run = Regex::new(BLANK_RUN).map_err(|e| MailprepError::InvalidPattern {
            name: "blank_run".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            patterns,
            blank_run,
        })
    }

    pub fn strip(&self, text: &str) -> String {
        let text = text.replace("\r\n", "\n");

        let mut cleaned = String::with_capacity(text.len());
        let mut cursor = 0;
        for (start, end) in self.separator_spans(&text) {
            cleaned.push_str(self.strip_segment(&text[cursor..start]));
            cleaned.push_str(&text[start..end]);
            cursor = end;
        }
        cleaned.push_str(self.strip_segment(&text[cursor..]));

        self.blank_run
            .replace_all(&cleaned, "\n\n")
            .trim()
            .to_string()
    }

    /// Non-overlapping separator matches from every rule, by position
    fn separator_spans(&self, text: &str) -> Vec<(usize, usize)> {
        let mut spans: Vec<(usize, usize)> = self
            .patterns
            .thread_separators
            .iter()
            .flat_map(|sep| sep.regex.find_iter(text).map(|m| (m.start(), m.end())))
            .collect();
        spans.sort_unstable();

        let mut kept: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
        for span in spans {
            match kept.last() {
                Some(&(_, last_end)) if span.0 < last_end => continue,
                _ => kept.push(span),
            }
        }
        kept
    }

    fn strip_segment<'a>(&self, segment: &'a str) -> &'a str {
        let cut = self
            .patterns
            .boilerplate
            .iter()
            .filter_map(|rule| rule.regex.find(segment).map(|m| (m.start(), &rule.name)))
            .min_by_key(|(start, _)| *start);

        match cut {
            Some((start, name)) => {
                tracing::debug!(
                    "Boilerplate rule {} removed {} bytes",
                    name,
                    segment.len() - start
                );
                &segment[..start]
            }
            None => segment,
        }
    }
}
