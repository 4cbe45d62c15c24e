//! Segment normalization and transcript text rendering.
//!
//! Normalization orders raw segments by start time and assigns stable
//! identifiers, so every downstream consumer (chunker, detector, providers)
//! can rely on segment order and non-empty ids.

use crate::models::{Segment, TranscriptDocument};

/// Order segments ascending by `start` and fill in missing ids.
///
/// The sort is stable: segments with equal start times keep their relative
/// input order. A segment with an empty id receives its post-sort positional
/// index (as a string); pre-existing ids are kept unchanged. Times and text
/// are passed through untouched.
pub fn normalize_segments(segments: &[Segment]) -> Vec<Segment> {
    let mut sorted: Vec<Segment> = segments.to_vec();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    for (index, segment) in sorted.iter_mut().enumerate() {
        if segment.id.is_empty() {
            segment.id = index.to_string();
        }
    }

    sorted
}

/// Render a document as plain text, one line per segment:
/// `[HH:MM:SS] Speaker: text`.
///
/// This is the transcript string handed to analysis providers and embedded
/// in prompts.
pub fn transcript_to_text(document: &TranscriptDocument) -> String {
    document
        .segments
        .iter()
        .map(|segment| {
            let speaker = segment
                .speaker
                .as_deref()
                .map(|s| format!("{}: ", s))
                .unwrap_or_default();
            format!(
                "[{}] {}{}",
                format_timestamp(segment.start),
                speaker,
                segment.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format seconds as `HH:MM:SS`, truncating fractional seconds.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TranscriptSource;

    fn segment(id: &str, text: &str, start: f64, end: f64) -> Segment {
        Segment {
            id: id.to_string(),
            text: text.to_string(),
            start,
            end,
            speaker: None,
        }
    }

    #[test]
    fn test_orders_by_start_and_fills_ids() {
        let segments = vec![segment("", "b", 5.0, 6.0), segment("x", "a", 1.0, 2.0)];
        let normalized = normalize_segments(&segments);
        assert_eq!(normalized[0].id, "x");
        assert_eq!(normalized[0].text, "a");
        assert_eq!(normalized[1].id, "1");
        assert_eq!(normalized[1].text, "b");
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize_segments(&[]).is_empty());
    }

    #[test]
    fn test_stable_on_equal_starts() {
        let segments = vec![
            segment("first", "one", 3.0, 4.0),
            segment("second", "two", 3.0, 4.0),
            segment("third", "three", 3.0, 4.0),
        ];
        let normalized = normalize_segments(&segments);
        let ids: Vec<&str> = normalized.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_idempotent() {
        let segments = vec![
            segment("", "later", 10.0, 12.0),
            segment("", "earlier", 2.0, 4.0),
            segment("keep", "kept", 6.0, 7.0),
        ];
        let once = normalize_segments(&segments);
        let twice = normalize_segments(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_existing_ids_unchanged() {
        let segments = vec![segment("a", "x", 1.0, 2.0), segment("", "y", 0.0, 1.0)];
        let normalized = normalize_segments(&segments);
        // "y" sorts first and takes index 0; "a" keeps its id.
        assert_eq!(normalized[0].id, "0");
        assert_eq!(normalized[1].id, "a");
    }

    #[test]
    fn test_transcript_text_includes_timestamps_and_speakers() {
        let doc = TranscriptDocument {
            video_id: "vid".to_string(),
            language: "en".to_string(),
            source: TranscriptSource::Uploaded,
            segments: vec![
                Segment {
                    id: "0".to_string(),
                    text: "hello there".to_string(),
                    start: 0.0,
                    end: 2.0,
                    speaker: Some("Alice".to_string()),
                },
                Segment {
                    id: "1".to_string(),
                    text: "hi".to_string(),
                    start: 3661.5,
                    end: 3663.0,
                    speaker: None,
                },
            ],
        };
        let text = transcript_to_text(&doc);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[00:00:00] Alice: hello there");
        assert_eq!(lines[1], "[01:01:01] hi");
    }

    #[test]
    fn test_format_timestamp_clamps_negative() {
        assert_eq!(format_timestamp(-5.0), "00:00:00");
    }
}
