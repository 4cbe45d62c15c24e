//! Subtitle and plain-text transcript parsing.
//!
//! Produces raw [`Segment`] sequences from SRT, WebVTT, or line-oriented
//! plain text. Cues with unparseable timestamps receive synthetic times so
//! downstream chunking always has a usable ordering. Output is unnormalized;
//! callers run it through [`crate::segments::normalize_segments`].

use crate::models::Segment;

/// Parse an `HH:MM:SS,mmm` (or `HH:MM:SS.mmm`) timestamp into seconds.
fn time_to_seconds(timestamp: &str) -> Option<f64> {
    let mut parts = timestamp.splitn(3, ':');
    let hours: f64 = parts.next()?.trim().parse().ok()?;
    let minutes: f64 = parts.next()?.trim().parse().ok()?;
    let rest = parts.next()?.trim();

    let (seconds_str, millis_str) = match rest.split_once([',', '.']) {
        Some((s, ms)) => (s, Some(ms)),
        None => (rest, None),
    };
    let seconds: f64 = seconds_str.parse().ok()?;
    let millis: f64 = millis_str.and_then(|ms| ms.parse().ok()).unwrap_or(0.0);

    Some(hours * 3600.0 + minutes * 60.0 + seconds + millis / 1000.0)
}

/// Parse SubRip (`.srt`) content into segments.
///
/// Cues are blank-line-separated blocks: index line, `start --> end` time
/// line, then one or more text lines joined with spaces. A cue with a
/// missing or malformed time line falls back to `index*4 .. index*4+3`.
pub fn parse_srt(content: &str) -> Vec<Segment> {
    content
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .enumerate()
        .map(|(index, block)| {
            let lines: Vec<&str> = block.lines().collect();
            let time_line = lines.get(1).copied().unwrap_or("");
            let mut times = time_line.split(" --> ");
            let start = times.next().and_then(|t| time_to_seconds(t.trim()));
            let end = times.next().and_then(|t| time_to_seconds(t.trim()));
            let text = lines
                .iter()
                .skip(2)
                .copied()
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string();

            Segment {
                id: index.to_string(),
                text,
                start: start.unwrap_or((index * 4) as f64),
                end: end.unwrap_or((index * 4 + 3) as f64),
                speaker: None,
            }
        })
        .collect()
}

/// Parse WebVTT (`.vtt`) content: strip the leading `WEBVTT` header, then
/// apply SRT cue rules.
pub fn parse_vtt(content: &str) -> Vec<Segment> {
    let cleaned = content
        .trim_start()
        .strip_prefix("WEBVTT")
        .or_else(|| content.trim_start().strip_prefix("webvtt"))
        .unwrap_or(content)
        .trim_start();
    parse_srt(cleaned)
}

/// Build segments from plain text: one segment per non-empty line, with
/// synthetic times `index*5 .. index*5+4`.
pub fn segments_from_plain_text(content: &str) -> Vec<Segment> {
    content
        .lines()
        .enumerate()
        .map(|(index, line)| Segment {
            id: index.to_string(),
            text: line.trim().to_string(),
            start: (index * 5) as f64,
            end: (index * 5 + 4) as f64,
            speaker: None,
        })
        .filter(|segment| !segment.text.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRT_SAMPLE: &str = "1\n00:00:01,000 --> 00:00:04,500\nHello and welcome back.\n\n2\n00:00:05,000 --> 00:00:09,250\nToday we talk about Rust.\nOwnership in particular.\n";

    #[test]
    fn test_parse_srt_times_and_text() {
        let segments = parse_srt(SRT_SAMPLE);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello and welcome back.");
        assert_eq!(segments[0].start, 1.0);
        assert_eq!(segments[0].end, 4.5);
        assert_eq!(segments[1].text, "Today we talk about Rust. Ownership in particular.");
        assert_eq!(segments[1].start, 5.0);
        assert_eq!(segments[1].end, 9.25);
    }

    #[test]
    fn test_parse_srt_assigns_sequential_ids() {
        let segments = parse_srt(SRT_SAMPLE);
        assert_eq!(segments[0].id, "0");
        assert_eq!(segments[1].id, "1");
    }

    #[test]
    fn test_parse_srt_malformed_time_falls_back() {
        let content = "1\nnot a time line\nSome text here.";
        let segments = parse_srt(content);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[0].end, 3.0);
        assert_eq!(segments[0].text, "Some text here.");
    }

    #[test]
    fn test_parse_vtt_strips_header() {
        let content = format!("WEBVTT\n\n{}", SRT_SAMPLE);
        let segments = parse_vtt(&content);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start, 1.0);
    }

    #[test]
    fn test_parse_vtt_dot_millis() {
        let content = "WEBVTT\n\n1\n00:00:01.500 --> 00:00:03.000\nDotted millis.";
        let segments = parse_vtt(content);
        assert_eq!(segments[0].start, 1.5);
        assert_eq!(segments[0].end, 3.0);
    }

    #[test]
    fn test_plain_text_lines_become_segments() {
        let segments = segments_from_plain_text("first line\n\nsecond line\nthird line\n");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].text, "first line");
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[0].end, 4.0);
        // Blank line keeps its index but is filtered out, so times skip.
        assert_eq!(segments[1].text, "second line");
        assert_eq!(segments[1].start, 10.0);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(parse_srt("").is_empty());
        assert!(segments_from_plain_text("").is_empty());
    }

    #[test]
    fn test_time_to_seconds() {
        assert_eq!(time_to_seconds("01:02:03,250"), Some(3723.25));
        assert_eq!(time_to_seconds("00:00:10"), Some(10.0));
        assert_eq!(time_to_seconds("garbage"), None);
    }
}
