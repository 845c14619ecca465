//! Best-effort language detection
//!
//! Detection is an optional capability: the preprocessor holds a
//! `Box<dyn LanguageDetector>` and uses a configured fallback code whenever
//! the detector returns nothing or is not confident enough.

use serde::{Deserialize, Serialize};

/// Detected language with the detector's confidence in `0.0..=1.0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub code: String,
    pub confidence: f64,
}

/// Guesses the language of a text
pub trait LanguageDetector: Send + Sync {
    /// `None` when the text gives nothing to go on
    fn detect(&self, text: &str) -> Option<Detection>;

    fn name(&self) -> &'static str;
}

/// Detector that never detects anything
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackDetector;

impl LanguageDetector for FallbackDetector {
    fn detect(&self, _text: &str) -> Option<Detection> {
        None
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

/// Trigram-based detector backed by `whatlang`
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<Detection> {
        if text.trim().is_empty() {
            return None;
        }

        let info = whatlang::detect(text)?;
        Some(Detection {
            code: short_code(info.lang().code()).to_string(),
            confidence: info.confidence(),
        })
    }

    fn name(&self) -> &'static str {
        "whatlang"
    }
}

/// ISO 639-3 to ISO 639-1 for languages we expect in mail; others pass through
fn short_code(iso639_3: &'static str) -> &'static str {
    match iso639_3 {
        "eng" => "en",
        "kor" => "ko",
        "jpn" => "ja",
        "cmn" => "zh",
        "spa" => "es",
        "fra" => "fr",
        "deu" => "de",
        "por" => "pt",
        "ita" => "it",
        "nld" => "nl",
        "rus" => "ru",
        "vie" => "vi",
        "tha" => "th",
        "ind" => "id",
        "tur" => "tr",
        "pol" => "pl",
        "swe" => "sv",
        other => other,
    }
}

/// Detection from `detector` if it clears `min_confidence`
///
/// `None` means the caller should use its fallback code.
pub fn confident_detection(
    detector: &dyn LanguageDetector,
    text: &str,
    min_confidence: f64,
) -> Option<Detection> {
    match detector.detect(text) {
        Some(detection) if detection.confidence >= min_confidence => Some(detection),
        Some(detection) => {
            tracing::warn!(
                "Language '{}' detected with low confidence {:.2}, ignoring",
                detection.code,
                detection.confidence
            );
            None
        }
        None => {
            tracing::debug!("Detector '{}' gave no result", detector.name());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_detector() {
        assert!(confident_detection(&FallbackDetector, "Hello there", 0.0).is_none());
    }

    #[test]
    fn test_whatlang_english() {
        let detection = WhatlangDetector
            .detect("I ordered a blender last week and it arrived broken. Please send a replacement as soon as possible.")
            .unwrap();
        assert_eq!(detection.code, "en");
        assert!(detection.confidence > 0.0);
    }

    #[test]
    fn test_whatlang_korean() {
        let detection = WhatlangDetector
            .detect("지난주에 주문한 믹서기가 파손된 상태로 도착했습니다. 교환 부탁드립니다.")
            .unwrap();
        assert_eq!(detection.code, "ko");
    }

    #[test]
    fn test_whatlang_empty() {
        assert!(WhatlangDetector.detect("").is_none());
        assert!(WhatlangDetector.detect("  \n").is_none());
    }

    #[test]
    fn test_low_confidence_falls_back() {
        struct Unsure;
        impl LanguageDetector for Unsure {
            fn detect(&self, _text: &str) -> Option<Detection> {
                Some(Detection {
                    code: "fr".to_string(),
                    confidence: 0.2,
                })
            }
            fn name(&self) -> &'static str {
                "unsure"
            }
        }

        assert!(confident_detection(&Unsure, "x", 0.5).is_none());
        assert_eq!(confident_detection(&Unsure, "x", 0.1).unwrap().code, "fr");
    }
}
