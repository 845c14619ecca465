// Integration tests for the full preprocessing pipeline
use mailprep::config::Config;
use mailprep::language::FallbackDetector;
use mailprep::patterns::PatternRegistry;
use mailprep::preprocess::{EmailPreprocessor, PreprocessingResult};
use mailprep::tokenizer::TokenCounter;
use mailprep::MailprepError;
use std::sync::Arc;

/// One token per whitespace-separated word, for exact pivot arithmetic
struct WordCounter;

impl TokenCounter for WordCounter {
    fn model(&self) -> &str {
        "words"
    }

    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    fn truncate_to_tokens(&self, text: &str, max_tokens: usize) -> String {
        text.split_whitespace()
            .take(max_tokens)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn word_preprocessor(config: &Config) -> EmailPreprocessor {
    EmailPreprocessor::from_parts(
        config,
        Arc::new(PatternRegistry::builtin().unwrap()),
        Arc::new(WordCounter),
        Box::new(FallbackDetector),
    )
    .unwrap()
}

const SCENARIO: &str = "Hello, thanks!\n\nBest regards,\nJohn (john@example.com)\n\n--- Original Message ---\nFrom: john@example.com\nPlease call 010-1234-5678.";

#[test]
fn test_scenario_with_real_tokenizer() {
    let preprocessor = EmailPreprocessor::new(&Config::default()).unwrap();
    let result = preprocessor.process_email_for_llm(SCENARIO);

    assert!(result.has_thread);
    assert!(!result.thread_summary_applied);
    assert_eq!(result.split.current_message, "Hello, thanks!");

    // The signature line is gone, so the email only survives in the thread
    assert!(!result.final_text.contains("John"));
    assert!(!result.final_text.contains("john@example.com"));
    assert!(!result.final_text.contains("010-1234-5678"));

    let email = &result.placeholders.forward["john@example.com"];
    let phone = &result.placeholders.forward["010-1234-5678"];
    assert_ne!(email, phone);
    assert!(result.split.thread_content.contains(email.as_str()));
    assert!(result.split.thread_content.contains(phone.as_str()));

    assert!(result.initial_token_count > 0);
    assert_eq!(result.initial_token_count, result.final_llm_input_token_count);
}

#[test]
fn test_empty_body() {
    let preprocessor = EmailPreprocessor::new(&Config::default()).unwrap();
    let result = preprocessor.process_email_for_llm("");

    assert_eq!(result.final_text, "");
    assert!(!result.has_thread);
    assert!(!result.thread_summary_applied);
    assert!(result.placeholders.is_empty());
    assert!(result.placeholders.reverse.is_empty());
    assert_eq!(result.detected_language, "ko");
}

fn thread_body(thread: &str) -> String {
    format!("Hello there.\n\n--- Original Message ---\n{}", thread)
}

#[test]
fn test_pivot_gate_boundary() {
    let preprocessor = word_preprocessor(&Config::default());

    // 2 (current) + 4 (label) + 594 (thread) = 600
    let at_pivot = thread_body("Refund status pending. ".repeat(198).trim_end());
    let result = preprocessor.process_email_for_llm(&at_pivot);
    assert!(result.has_thread);
    assert_eq!(result.initial_token_count, 600);
    assert!(!result.thread_summary_applied);

    // One more word tips it over
    let over_pivot = thread_body(&format!(
        "{}Refund status still pending.",
        "Refund status pending. ".repeat(197)
    ));
    let result = preprocessor.process_email_for_llm(&over_pivot);
    assert_eq!(result.initial_token_count, 601);
    assert!(result.thread_summary_applied);
    assert!(result
        .final_text
        .contains("--- Previous conversation summary ---"));
    assert!(result.final_llm_input_token_count <= 2 + 5 + 300);
}

#[test]
fn test_summary_fallback_when_nothing_fits() {
    let mut config = Config::default();
    config.limits.pivot_token_limit = 10;
    config.limits.max_summary_tokens = 3;

    // A single long sentence cannot fit a 3-token summary
    let body = thread_body(&"word ".repeat(40));
    let result = word_preprocessor(&config).process_email_for_llm(&body);

    assert!(result.has_thread);
    assert!(!result.thread_summary_applied);
    assert!(result.final_text.contains("--- Previous conversation ---"));
    assert_eq!(result.initial_token_count, result.final_llm_input_token_count);
}

#[test]
fn test_custom_labels() {
    let mut config = Config::default();
    config.labels.thread = "=== 이전 대화 ===".to_string();

    let result = word_preprocessor(&config)
        .process_email_for_llm("New.\n\n--- Original Message ---\nOld.");
    assert_eq!(result.final_text, "New.\n\n=== 이전 대화 ===\nOld.");
}

#[test]
fn test_repeated_value_single_placeholder() {
    let body = "Reach me at kim@example.com.\n\nOn Tue, Kim <kim@example.com> wrote:\nMy mail is kim@example.com";
    let result = word_preprocessor(&Config::default()).process_email_for_llm(body);

    assert!(result.has_thread);
    assert_eq!(result.placeholders.len(), 1);
    let placeholder = &result.placeholders.forward["kim@example.com"];
    assert_eq!(result.final_text.matches(placeholder.as_str()).count(), 2);
}

#[test]
fn test_result_survives_json_for_later_restore() {
    let preprocessor = word_preprocessor(&Config::default());
    let result = preprocessor.process_email_for_llm("Customer ID: AB12345 asked about CUS-99887766.");

    let json = serde_json::to_string(&result).unwrap();
    let loaded: PreprocessingResult = serde_json::from_str(&json).unwrap();

    let reply = format!(
        "Hello {}, your account {} is active. See [PH_FFFFFFFF].",
        loaded.placeholders.forward["Customer ID: AB12345"],
        loaded.placeholders.forward["CUS-99887766"]
    );
    assert_eq!(
        loaded.restore(&reply),
        "Hello Customer ID: AB12345, your account CUS-99887766 is active. See [PH_FFFFFFFF]."
    );
}

#[test]
fn test_language_detection() {
    let preprocessor = EmailPreprocessor::new(&Config::default()).unwrap();

    let english = preprocessor.process_email_for_llm(
        "I ordered a coffee grinder two weeks ago and it still has not arrived. Could you check the delivery status for me?",
    );
    assert_eq!(english.detected_language, "en");
    assert!(english.language_confidence.is_some());

    let korean = preprocessor.process_email_for_llm(
        "2주 전에 커피 그라인더를 주문했는데 아직 도착하지 않았습니다. 배송 상태를 확인해 주실 수 있을까요?",
    );
    assert_eq!(korean.detected_language, "ko");
}

#[test]
fn test_detection_disabled_uses_fallback() {
    let mut config = Config::default();
    config.language.detect = false;
    config.language.fallback = "en".to_string();

    let result = EmailPreprocessor::new(&config)
        .unwrap()
        .process_email_for_llm("Bonjour, je voudrais un remboursement pour ma commande.");
    assert_eq!(result.detected_language, "en");
    assert!(result.language_confidence.is_none());
}

#[test]
fn test_unknown_model_fails_at_construction() {
    let mut config = Config::default();
    config.tokenizer.model = "no-such-model".to_string();

    let err = EmailPreprocessor::new(&config).err().unwrap();
    assert!(matches!(err, MailprepError::UnsupportedModel { .. }));
}

#[test]
fn test_unknown_tokenizer_language_fails_at_construction() {
    let mut config = Config::default();
    config.summarizer.stopword_language = "klingon".to_string();

    match EmailPreprocessor::new(&config) {
        Err(MailprepError::InvalidConfigValue { path, .. }) => {
            assert_eq!(path, "summarizer.stopword_language");
        }
        other => panic!("expected construction failure, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_invalid_config_fails_at_construction() {
    let mut config = Config::default();
    config.limits.max_summary_tokens = 0;

    let err = EmailPreprocessor::new(&config).err().unwrap();
    assert!(matches!(err, MailprepError::ConfigValidation { .. }));
}

#[test]
fn test_pattern_file_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patterns.toml");
    std::fs::write(
        &path,
        r#"
[[redaction]]
name = "ticket"
class = "identifier"
pattern = 'TICKET-[0-9]+'

[[thread_separator]]
name = "quote_marker"
pattern = '\n=== quoted ===\n'
"#,
    )
    .unwrap();

    let mut config = Config::default();
    config.patterns.file = Some(path);

    let preprocessor = EmailPreprocessor::new(&config).unwrap();
    let result = preprocessor
        .process_email_for_llm("About TICKET-42, mail a@b.io\n=== quoted ===\nEarlier text");

    assert!(result.has_thread);
    assert_eq!(result.split.separator.as_deref(), Some("quote_marker"));
    assert!(result.placeholders.forward.contains_key("TICKET-42"));
    // No email rule in this table
    assert!(result.final_text.contains("a@b.io"));
}

#[test]
fn test_shared_instance_across_threads() {
    let preprocessor = Arc::new(word_preprocessor(&Config::default()));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let p = preprocessor.clone();
            std::thread::spawn(move || {
                let body = format!("Contact user{}@example.com please.", i);
                (i, p.process_email_for_llm(&body))
            })
        })
        .collect();

    for handle in handles {
        let (i, result) = handle.join().unwrap();
        assert_eq!(result.placeholders.len(), 1);
        assert!(result
            .placeholders
            .forward
            .contains_key(&format!("user{}@example.com", i)));
    }
}
