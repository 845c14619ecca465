//! Pattern registry for redaction, boilerplate stripping and thread splitting
//!
//! This module provides:
//! - Declarative pattern tables loaded from TOML (built-in or user supplied)
//! - Redaction rules grouped by sensitive class in a fixed priority order
//! - Boilerplate rules that truncate a message segment
//! - Thread separator rules evaluated in declaration order
//!
//! Every regex is compiled once at construction; an invalid entry is a fatal
//! construction error rather than a per-email failure.

use crate::error::{MailprepError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Built-in tables shipped with the crate
pub const BUILTIN_PATTERNS: &str = include_str!("../../config-templates/patterns.toml");

/// Classes of sensitive substrings, in the order they are redacted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitiveClass {
    /// Customer/order/account identifiers
    Identifier,
    /// Email addresses
    Email,
    /// Phone numbers
    Phone,
}

impl SensitiveClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensitiveClass::Identifier => "identifier",
            SensitiveClass::Email => "email",
            SensitiveClass::Phone => "phone",
        }
    }
}

/// Redaction rule as written in the pattern file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionRuleConfig {
    pub name: String,
    pub class: SensitiveClass,
    pub pattern: String,
    #[serde(default)]
    pub description: String,
}

/// Named pattern as written in the pattern file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRuleConfig {
    pub name: String,
    pub pattern: String,
}

/// Pattern file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternTables {
    #[serde(default)]
    pub redaction: Vec<RedactionRuleConfig>,
    #[serde(default)]
    pub boilerplate: Vec<PatternRuleConfig>,
    #[serde(default)]
    pub thread_separator: Vec<PatternRuleConfig>,
}

impl PatternTables {
    /// Parse the tables embedded in the crate
    pub fn builtin() -> Result<Self> {
        Ok(toml::from_str(BUILTIN_PATTERNS)?)
    }
}

/// Compiled redaction rule
#[derive(Debug, Clone)]
pub struct CompiledRedactionRule {
    pub name: String,
    pub class: SensitiveClass,
    pub regex: Regex,
}

/// Compiled named pattern (boilerplate or thread separator)
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub name: String,
    pub regex: Regex,
}

/// Registry with all pre-compiled patterns
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    /// Redaction rules, ordered by class then declaration
    pub redaction: Vec<CompiledRedactionRule>,
    /// Boilerplate rules
    pub boilerplate: Vec<CompiledPattern>,
    /// Thread separators, highest priority first
    pub thread_separators: Vec<CompiledPattern>,
}

impl PatternRegistry {
    /// Registry built from the embedded tables
    pub fn builtin() -> Result<Self> {
        Self::from_tables(PatternTables::builtin()?)
    }

    /// Load the registry from a pattern file
    pub fn from_config_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MailprepError::Io {
            source: e,
            context: format!("Failed to read pattern file: {:?}", path),
        })?;
        let tables: PatternTables = toml::from_str(&content)?;

        Self::from_tables(tables)
    }

    /// Build the registry from parsed tables
    pub fn from_tables(tables: PatternTables) -> Result<Self> {
        let mut redaction = tables
            .redaction
            .iter()
            .map(|rule| {
                compile(&rule.name, &rule.pattern).map(|regex| CompiledRedactionRule {
                    name: rule.name.clone(),
                    class: rule.class,
                    regex,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Stable: declaration order is kept within a class
        redaction.sort_by_key(|r| r.class);

        let boilerplate = compile_all(&tables.boilerplate)?;
        let thread_separators = compile_all(&tables.thread_separator)?;

        tracing::debug!(
            "Compiled {} redaction, {} boilerplate and {} separator patterns",
            redaction.len(),
            boilerplate.len(),
            thread_separators.len()
        );

        Ok(Self {
            redaction,
            boilerplate,
            thread_separators,
        })
    }

    /// Redaction rules for one class, in application order
    pub fn redaction_rules(
        &self,
        class: SensitiveClass,
    ) -> impl Iterator<Item = &CompiledRedactionRule> {
        self.redaction.iter().filter(move |r| r.class == class)
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| MailprepError::InvalidPattern {
        name: name.to_string(),
        message: e.to_string(),
    })
}

fn compile_all(rules: &[PatternRuleConfig]) -> Result<Vec<CompiledPattern>> {
    rules
        .iter()
        .map(|rule| {
            compile(&rule.name, &rule.pattern).map(|regex| CompiledPattern {
                name: rule.name.clone(),
                regex,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_compile() {
        let registry = PatternRegistry::builtin().unwrap();
        assert_eq!(registry.redaction.len(), 6);
        assert_eq!(registry.boilerplate.len(), 3);
        assert_eq!(registry.thread_separators.len(), 4);
        assert_eq!(registry.thread_separators[0].name, "original_message");
    }

    #[test]
    fn test_redaction_sorted_by_class() {
        let tables = PatternTables {
            redaction: vec![
                RedactionRuleConfig {
                    name: "phone".to_string(),
                    class: SensitiveClass::Phone,
                    pattern: r"\d{3}-\d{4}".to_string(),
                    description: String::new(),
                },
                RedactionRuleConfig {
                    name: "email".to_string(),
                    class: SensitiveClass::Email,
                    pattern: r"\S+@\S+".to_string(),
                    description: String::new(),
                },
                RedactionRuleConfig {
                    name: "id".to_string(),
                    class: SensitiveClass::Identifier,
                    pattern: r"ID-\d+".to_string(),
                    description: String::new(),
                },
            ],
            boilerplate: vec![],
            thread_separator: vec![],
        };

        let registry = PatternRegistry::from_tables(tables).unwrap();
        let names: Vec<&str> = registry.redaction.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["id", "email", "phone"]);
    }

    #[test]
    fn test_invalid_pattern_is_fatal() {
        let tables = PatternTables {
            redaction: vec![],
            boilerplate: vec![PatternRuleConfig {
                name: "broken".to_string(),
                pattern: "(unclosed".to_string(),
            }],
            thread_separator: vec![],
        };

        match PatternRegistry::from_tables(tables) {
            Err(MailprepError::InvalidPattern { name, .. }) => assert_eq!(name, "broken"),
            other => panic!("expected InvalidPattern, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_builtin_identifier_patterns() {
        let registry = PatternRegistry::builtin().unwrap();
        let ids: Vec<&CompiledRedactionRule> =
            registry.redaction_rules(SensitiveClass::Identifier).collect();

        assert!(ids[0].regex.is_match("order ORD-98765432 shipped"));
        assert!(ids[0].regex.is_match("CUS_ABC12345"));
        assert!(!ids[0].regex.is_match("according to the plan"));
        assert!(ids[1].regex.is_match("Customer ID: AB1234"));
        assert!(ids[1].regex.is_match("주문번호: 12345678"));
        assert!(!ids[1].regex.is_match("a valid user"));
    }

    #[test]
    fn test_builtin_phone_patterns_next_to_hangul() {
        let registry = PatternRegistry::builtin().unwrap();
        let mobile = registry
            .redaction_rules(SensitiveClass::Phone)
            .next()
            .unwrap();

        let m = mobile.regex.find("연락처 010-9876-5432로 주세요").unwrap();
        assert_eq!(m.as_str(), "010-9876-5432");
    }
}
