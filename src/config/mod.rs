//! Configuration management for mailprep
//!
//! Replaces loosely keyed settings with typed sections. Every value has a
//! documented default and the whole structure is validated once, before a
//! preprocessor is built from it.

use crate::error::{MailprepError, Result};
use crate::summarizer::SelectionStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Schema version understood by this build
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Placeholder substituted with the preprocessed email in the prompt template
pub const EMAIL_CONTENT_SLOT: &str = "{email_content}";

/// Placeholder substituted with the classification label in the prompt template
pub const CLASSIFICATION_SLOT: &str = "{classification}";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub language: LanguageConfig,
    #[serde(default)]
    pub labels: LabelsConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub patterns: PatternsConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Model whose tokenizer measures every size in the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    pub model: String,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
        }
    }
}

/// Token budgets and input bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Combined prompt + generation budget of the drafting model
    pub max_main_llm_tokens: usize,
    /// Budget for the extractive thread summary
    pub max_summary_tokens: usize,
    /// Threads whose concatenated size exceeds this are summarized
    pub pivot_token_limit: usize,
    /// Lower bound for the generation budget handed to the drafting model
    #[serde(default = "default_min_generation_tokens")]
    pub min_generation_tokens: usize,
    /// Bodies longer than this (in chars) are cut before any regex runs
    #[serde(default = "default_max_body_chars")]
    pub max_body_chars: usize,
}

fn default_min_generation_tokens() -> usize {
    50
}

fn default_max_body_chars() -> usize {
    200_000
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_main_llm_tokens: 4000,
            max_summary_tokens: 300,
            pivot_token_limit: 600,
            min_generation_tokens: default_min_generation_tokens(),
            max_body_chars: default_max_body_chars(),
        }
    }
}

/// Statistical summarizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    pub stopword_language: String,
    pub min_token_chars: usize,
    #[serde(default)]
    pub selection: SelectionStrategy,
    pub ellipsis: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            stopword_language: "en".to_string(),
            min_token_chars: 2,
            selection: SelectionStrategy::default(),
            ellipsis: "...".to_string(),
        }
    }
}

/// Language detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub detect: bool,
    pub fallback: String,
    pub min_confidence: f64,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            detect: true,
            fallback: "ko".to_string(),
            min_confidence: 0.0,
        }
    }
}

/// Separator lines inserted between the current message and older content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsConfig {
    pub thread: String,
    pub summary: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            thread: "--- Previous conversation ---".to_string(),
            summary: "--- Previous conversation summary ---".to_string(),
        }
    }
}

/// Draft prompt template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    pub template: String,
    pub default_classification: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: concat!(
                "Write a friendly, professional reply draft to the email below, ",
                "appropriate for a \"{classification}\" request.\n",
                "Keep the reply under 200 characters and ask for any additional ",
                "information that is needed.\n\n",
                "--- Email ---\n",
                "{email_content}\n",
                "---\n"
            )
            .to_string(),
            default_classification: "general inquiry".to_string(),
        }
    }
}

/// Optional replacement for the built-in pattern tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MailprepError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| MailprepError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| MailprepError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: MAILPREP_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        let overrides: Vec<(String, String)> = std::env::vars()
            .filter_map(|(key, value)| {
                key.strip_prefix("MAILPREP_")
                    .map(|config_key| (config_key.to_string(), value))
            })
            .collect();
        self.apply_overrides(overrides);
    }

    /// Apply `SECTION__KEY` overrides, logging the ones that fail to parse
    pub fn apply_overrides<I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in overrides {
            if let Err(e) = self.set_value_from_env(&key, &value) {
                tracing::warn!("Failed to apply env override {}: {}", key, e);
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "TOKENIZER__MODEL" => {
                self.tokenizer.model = value.to_string();
            }
            "LIMITS__MAX_MAIN_LLM_TOKENS" => {
                self.limits.max_main_llm_tokens = parse_usize(path, value)?;
            }
            "LIMITS__MAX_SUMMARY_TOKENS" => {
                self.limits.max_summary_tokens = parse_usize(path, value)?;
            }
            "LIMITS__PIVOT_TOKEN_LIMIT" => {
                self.limits.pivot_token_limit = parse_usize(path, value)?;
            }
            "LIMITS__MAX_BODY_CHARS" => {
                self.limits.max_body_chars = parse_usize(path, value)?;
            }
            "LIMITS__MIN_GENERATION_TOKENS" => {
                self.limits.min_generation_tokens = parse_usize(path, value)?;
            }
            "SUMMARIZER__STOPWORD_LANGUAGE" => {
                self.summarizer.stopword_language = value.to_string();
            }
            "SUMMARIZER__MIN_TOKEN_CHARS" => {
                self.summarizer.min_token_chars = parse_usize(path, value)?;
            }
            "SUMMARIZER__SELECTION" => {
                self.summarizer.selection = match value {
                    "stop_at_overflow" => SelectionStrategy::StopAtOverflow,
                    "skip_overflow" => SelectionStrategy::SkipOverflow,
                    _ => {
                        return Err(MailprepError::InvalidConfigValue {
                            path: path.to_string(),
                            message: format!(
                                "Expected 'stop_at_overflow' or 'skip_overflow', got '{}'",
                                value
                            ),
                        })
                    }
                };
            }
            "SUMMARIZER__ELLIPSIS" => {
                self.summarizer.ellipsis = value.to_string();
            }
            "LANGUAGE__DETECT" => {
                self.language.detect =
                    value
                        .parse()
                        .map_err(|_| MailprepError::InvalidConfigValue {
                            path: path.to_string(),
                            message: format!("Cannot parse '{}' as boolean", value),
                        })?;
            }
            "LANGUAGE__FALLBACK" => {
                self.language.fallback = value.to_string();
            }
            "LANGUAGE__MIN_CONFIDENCE" => {
                self.language.min_confidence =
                    value
                        .parse()
                        .map_err(|_| MailprepError::InvalidConfigValue {
                            path: path.to_string(),
                            message: format!("Cannot parse '{}' as a number", value),
                        })?;
            }
            "LABELS__THREAD" => {
                self.labels.thread = value.to_string();
            }
            "LABELS__SUMMARY" => {
                self.labels.summary = value.to_string();
            }
            "PATTERNS__FILE" => {
                self.patterns.file = Some(PathBuf::from(value));
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            MailprepError::Config("Cannot determine config directory".to_string())
        })?;

        Ok(config_dir.join("mailprep").join("config.toml"))
    }
}

fn parse_usize(path: &str, value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| MailprepError::InvalidConfigValue {
            path: path.to_string(),
            message: format!("Cannot parse '{}' as a non-negative integer", value),
        })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: SCHEMA_VERSION.to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            tokenizer: TokenizerConfig::default(),
            limits: LimitsConfig::default(),
            summarizer: SummarizerConfig::default(),
            language: LanguageConfig::default(),
            labels: LabelsConfig::default(),
            prompt: PromptConfig::default(),
            patterns: PatternsConfig::default(),
        }
    }
}
