//! Content-word extraction for sentence scoring
//!
//! Only "meaningful" tokens take part in frequency scoring. The default
//! implementation approximates a part-of-speech filter with stopword removal;
//! a real morphological tagger can be plugged in through [`ContentTokenizer`].

use crate::error::{MailprepError, Result};
use ahash::HashSet;
use regex::Regex;
use stop_words::{get, LANGUAGE};

/// Unicode word runs; placeholder tags survive as a single token
const WORD_PATTERN: &str = r"[\p{L}\p{M}\p{N}_]+";

/// Common Korean particles and copula endings, longest first
const KOREAN_SUFFIXES: &[&str] = &[
    "입니다", "합니다", "에서", "으로", "에게", "까지", "부터", "은", "는", "이", "가", "을",
    "를", "에", "의", "로", "와", "과", "도", "만",
];

/// Stems left by a one-syllable particle must be at least this long
const MIN_STEM_SYLLABLES: usize = 2;

/// Extracts the tokens that count toward a sentence's score
pub trait ContentTokenizer: Send + Sync {
    fn content_tokens(&self, sentence: &str) -> Vec<String>;
}

/// Stopword-filtering tokenizer
#[derive(Debug, Clone)]
pub struct StopwordTokenizer {
    stopwords: HashSet<String>,
    min_chars: usize,
    word: Regex,
}

impl StopwordTokenizer {
    /// Tokenizer with the stopword list for `language`
    ///
    /// Fails for languages without a stopword list.
    pub fn new(language: &str, min_chars: usize) -> Result<Self> {
        Self::build(Self::load_stopwords(language)?, min_chars)
    }

    /// Tokenizer with a custom stopword list
    pub fn from_list(words: &[&str], min_chars: usize) -> Result<Self> {
        Self::build(words.iter().map(|w| w.to_lowercase()).collect(), min_chars)
    }

    fn build(stopwords: HashSet<String>, min_chars: usize) -> Result<Self> {
        let word = Regex::new(WORD_PATTERN).map_err(|e| MailprepError::InvalidPattern {
            name: "content_word".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            stopwords,
            min_chars,
            word,
        })
    }

    fn load_stopwords(language: &str) -> Result<HashSet<String>> {
        let lang = match language.to_lowercase().as_str() {
            "en" | "english" => LANGUAGE::English,
            "de" | "german" => LANGUAGE::German,
            "fr" | "french" => LANGUAGE::French,
            "es" | "spanish" => LANGUAGE::Spanish,
            "it" | "italian" => LANGUAGE::Italian,
            "pt" | "portuguese" => LANGUAGE::Portuguese,
            "nl" | "dutch" => LANGUAGE::Dutch,
            "ru" | "russian" => LANGUAGE::Russian,
            "sv" | "swedish" => LANGUAGE::Swedish,
            "tr" | "turkish" => LANGUAGE::Turkish,
            "pl" | "polish" => LANGUAGE::Polish,
            "ko" | "korean" => return Ok(Self::korean_stopwords()),
            other => {
                return Err(MailprepError::InvalidConfigValue {
                    path: "summarizer.stopword_language".to_string(),
                    message: format!("No content tokenizer for language '{}'", other),
                })
            }
        };

        Ok(get(lang).iter().map(|s| s.to_string()).collect())
    }

    /// Korean function words that survive particle stripping
    fn korean_stopwords() -> HashSet<String> {
        [
            "그리고", "그러나", "하지만", "그래서", "또한", "제", "저", "저희", "이", "그", "저것",
            "이것", "그것", "것", "수", "등", "및", "더", "좀", "잘", "안녕하세요", "감사합니다",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn strip_korean_suffix(word: &str) -> &str {
        if !word.chars().any(is_hangul) {
            return word;
        }

        for suffix in KOREAN_SUFFIXES {
            if let Some(stem) = word.strip_suffix(suffix) {
                let min_stem = if suffix.chars().count() == 1 {
                    MIN_STEM_SYLLABLES
                } else {
                    1
                };
                if stem.chars().count() >= min_stem {
                    return stem;
                }
            }
        }
        word
    }
}

impl ContentTokenizer for StopwordTokenizer {
    fn content_tokens(&self, sentence: &str) -> Vec<String> {
        self.word
            .find_iter(sentence)
            .map(|m| m.as_str().to_lowercase())
            .filter(|w| !self.stopwords.contains(w))
            .map(|w| Self::strip_korean_suffix(&w).to_string())
            .filter(|w| {
                w.chars().count() >= self.min_chars
                    && !w.chars().all(|c| c.is_numeric())
                    && !self.stopwords.contains(w)
            })
            .collect()
    }
}

fn is_hangul(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}
