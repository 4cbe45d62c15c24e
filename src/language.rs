//! Trigram-based language detection with a confidence/reliability contract.
//!
//! Wraps the `whatlang` classifier and maps its ISO 639-3 output to 639-1
//! codes via `isolang`. Detection is total: malformed or unrecognizable
//! input degrades to the English default instead of failing. The confidence
//! score is the classifier's statistical estimate clamped to `[0, 1]` — an
//! approximation, not a calibrated probability — and reliability is a fixed
//! banding of that score.

use crate::models::{LanguageDetection, Reliability, Segment};

/// Inputs shorter than this (after whitespace collapsing) are not
/// detectable and return the default.
const MIN_DETECTABLE_CHARS: usize = 20;

/// High-reliability confidence floor.
const HIGH_CONFIDENCE: f64 = 0.85;
/// Medium-reliability confidence floor.
const MEDIUM_CONFIDENCE: f64 = 0.60;

fn default_detection() -> LanguageDetection {
    LanguageDetection {
        language: "en".to_string(),
        confidence: 0.0,
        reliability: Reliability::Low,
    }
}

/// Detect the language of raw text.
///
/// Whitespace runs are collapsed before measuring length; inputs under 20
/// characters return `{en, 0.0, low}` without consulting the classifier.
pub fn detect_language(text: &str) -> LanguageDetection {
    let sanitized = sanitize(text);
    if sanitized.chars().count() < MIN_DETECTABLE_CHARS {
        return default_detection();
    }

    let info = match whatlang::detect(&sanitized) {
        Some(info) => info,
        None => return default_detection(),
    };

    to_detection(info.lang().code(), info.confidence())
}

/// Detect the language of a segment collection (texts joined with spaces).
pub fn detect_language_segments(segments: &[Segment]) -> LanguageDetection {
    let joined = segments
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    detect_language(&joined)
}

/// Collapse whitespace runs to single spaces and trim the ends.
fn sanitize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build a detection from a 639-3 code and a raw confidence estimate.
///
/// Unmappable codes fall back to `"en"`; the reliability band is a pure
/// function of the clamped confidence.
fn to_detection(code: &str, confidence: f64) -> LanguageDetection {
    let iso = isolang::Language::from_639_3(code)
        .and_then(|lang| lang.to_639_1())
        .unwrap_or("en");

    let confidence = confidence.clamp(0.0, 1.0);
    let reliability = if confidence >= HIGH_CONFIDENCE {
        Reliability::High
    } else if confidence >= MEDIUM_CONFIDENCE {
        Reliability::Medium
    } else {
        Reliability::Low
    };

    LanguageDetection {
        language: iso.to_string(),
        confidence,
        reliability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_english_reliably() {
        let sample = "This is a simple example transcript containing multiple sentences \
                      to ensure language detection works properly.";
        let result = detect_language(sample);
        assert_eq!(result.language, "en");
        assert!(result.confidence > 0.4);
    }

    #[test]
    fn test_short_text_falls_back_to_default() {
        let result = detect_language("Hi");
        assert_eq!(result.language, "en");
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.reliability, Reliability::Low);
    }

    #[test]
    fn test_whitespace_only_is_default() {
        let result = detect_language("   \n\t  ");
        assert_eq!(result.language, "en");
        assert_eq!(result.reliability, Reliability::Low);
    }

    #[test]
    fn test_whitespace_does_not_pad_length() {
        // 19 meaningful chars padded with whitespace must still be "short".
        let padded = format!("   {}   ", "a".repeat(19));
        let result = detect_language(&padded);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_segments_are_joined_for_detection() {
        let segments: Vec<Segment> = [
            "The quick brown fox jumps over the lazy dog",
            "while the rest of the sentence keeps going in plain English",
        ]
        .iter()
        .enumerate()
        .map(|(index, text)| Segment {
            id: index.to_string(),
            text: text.to_string(),
            start: index as f64,
            end: index as f64 + 1.0,
            speaker: None,
        })
        .collect();
        let result = detect_language_segments(&segments);
        assert_eq!(result.language, "en");
        assert!(result.confidence > 0.0);
    }

    #[test]
    fn test_reliability_banding() {
        assert_eq!(to_detection("eng", 0.95).reliability, Reliability::High);
        assert_eq!(to_detection("eng", 0.85).reliability, Reliability::High);
        assert_eq!(to_detection("eng", 0.70).reliability, Reliability::Medium);
        assert_eq!(to_detection("eng", 0.60).reliability, Reliability::Medium);
        assert_eq!(to_detection("eng", 0.30).reliability, Reliability::Low);
    }

    #[test]
    fn test_confidence_clamped() {
        assert_eq!(to_detection("eng", 1.7).confidence, 1.0);
        assert_eq!(to_detection("eng", -0.2).confidence, 0.0);
    }

    #[test]
    fn test_unmappable_code_falls_back_to_english() {
        let result = to_detection("zzz", 0.9);
        assert_eq!(result.language, "en");
    }

    #[test]
    fn test_three_letter_codes_map_to_two_letters() {
        assert_eq!(to_detection("spa", 0.9).language, "es");
        assert_eq!(to_detection("deu", 0.9).language, "de");
        assert_eq!(to_detection("fra", 0.9).language, "fr");
    }
}
