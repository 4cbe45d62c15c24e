//! Transcript export rendering and token-gated delivery.
//!
//! Renders a transcript (optionally together with analysis results) as
//! Markdown, CSV, or a minimal PDF, and manages single-use download
//! tokens: `create_export` renders the bytes and hands back a token,
//! `consume_export` redeems it exactly once before the TTL expires.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use uuid::Uuid;

use crate::models::{
    ExportFormat, KeywordResponse, Segment, SentimentTimeline, SummaryResponse,
    TranscriptDocument,
};

/// Markdown and CSV stop after this many segments to bound output size.
const SEGMENT_LIMIT: usize = 500;
/// The PDF renderer uses one text line per segment on a single page.
const PDF_SEGMENT_LIMIT: usize = 40;

/// What to render: the transcript plus whichever analysis sections the
/// caller has already computed. Absent sections are simply omitted.
pub struct ExportRequest<'a> {
    pub document: &'a TranscriptDocument,
    pub summary: Option<&'a SummaryResponse>,
    pub keywords: Option<&'a KeywordResponse>,
    pub sentiment: Option<&'a SentimentTimeline>,
}

impl<'a> ExportRequest<'a> {
    /// A transcript-only export with no analysis sections.
    pub fn transcript_only(document: &'a TranscriptDocument) -> Self {
        Self {
            document,
            summary: None,
            keywords: None,
            sentiment: None,
        }
    }
}

fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Render the export as Markdown: metadata header, any analysis sections,
/// then a table of timestamped segments.
pub fn render_markdown(request: &ExportRequest) -> String {
    let document = request.document;
    let mut out = String::new();
    out.push_str(&format!("# Transcript: {}\n\n", document.video_id));
    out.push_str(&format!("Language: {}\n\n", document.language));

    if let Some(summary) = request.summary {
        out.push_str("## Summary\n\n");
        out.push_str(&summary.detailed);
        out.push_str("\n\n");
        if !summary.chapters.is_empty() {
            out.push_str("### Chapters\n\n");
            for chapter in &summary.chapters {
                out.push_str(&format!(
                    "- {} to {} {}\n",
                    format_time(chapter.start),
                    format_time(chapter.end),
                    chapter.title
                ));
            }
            out.push('\n');
        }
    }

    if let Some(keywords) = request.keywords {
        out.push_str("## Keywords\n\n");
        for topic in &keywords.topics {
            out.push_str(&format!("- {} ({})\n", topic.term, topic.weight));
        }
        out.push('\n');
    }

    if let Some(sentiment) = request.sentiment {
        out.push_str("## Sentiment\n\n");
        out.push_str(&format!(
            "Average score {:.2} across {} points.\n\n",
            sentiment.average_score,
            sentiment.points.len()
        ));
    }

    out.push_str("## Transcript\n\n");
    out.push_str("| Time | Speaker | Text |\n");
    out.push_str("| --- | --- | --- |\n");
    for segment in document.segments.iter().take(SEGMENT_LIMIT) {
        let speaker = segment.speaker.as_deref().unwrap_or("-");
        let text = segment.text.replace('|', "\\|");
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            format_time(segment.start),
            speaker.replace('|', "\\|"),
            text
        ));
    }
    if document.segments.len() > SEGMENT_LIMIT {
        out.push_str(&format!(
            "\n_Truncated to the first {} of {} segments._\n",
            SEGMENT_LIMIT,
            document.segments.len()
        ));
    }
    out
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render the transcript as CSV with a header row. Analysis sections do
/// not fit a row-oriented format and are ignored.
pub fn render_csv(request: &ExportRequest) -> String {
    let document = request.document;
    let mut out = String::from("start,end,speaker,text\n");
    for segment in document.segments.iter().take(SEGMENT_LIMIT) {
        out.push_str(&format!(
            "{},{},{},{}\n",
            segment.start,
            segment.end,
            csv_field(segment.speaker.as_deref().unwrap_or("")),
            csv_field(&segment.text)
        ));
    }
    if document.segments.len() > SEGMENT_LIMIT {
        out.push_str(&format!(
            "# truncated to first {} of {} segments\n",
            SEGMENT_LIMIT,
            document.segments.len()
        ));
    }
    out
}

fn pdf_escape(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii() && !c.is_control())
        .collect::<String>()
        .replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

fn pdf_line(segment: &Segment) -> String {
    let mut text: String = segment.text.chars().take(90).collect();
    if let Some(speaker) = &segment.speaker {
        text = format!("{}: {}", speaker, text);
    }
    format!("[{}] {}", format_time(segment.start), text)
}

/// Render a minimal single-page PDF 1.4 document.
///
/// Title and analysis lines first, then one Helvetica text line per
/// segment, capped at [`PDF_SEGMENT_LIMIT`]. The structure is the smallest
/// valid file a PDF reader accepts: catalog, page tree, one page, one
/// content stream, one font, and a cross-reference table with correct
/// byte offsets.
pub fn render_pdf(request: &ExportRequest) -> Vec<u8> {
    let document = request.document;
    let mut lines = vec![
        format!("Transcript: {}", pdf_escape(&document.video_id)),
        format!("Language: {}", pdf_escape(&document.language)),
    ];
    if let Some(summary) = request.summary {
        lines.push(String::new());
        for bullet in summary.short.lines().take(3) {
            lines.push(pdf_escape(bullet));
        }
    }
    if let Some(keywords) = request.keywords {
        let terms: Vec<&str> = keywords
            .topics
            .iter()
            .take(8)
            .map(|t| t.term.as_str())
            .collect();
        lines.push(String::new());
        lines.push(pdf_escape(&format!("Keywords: {}", terms.join(", "))));
    }
    if let Some(sentiment) = request.sentiment {
        lines.push(pdf_escape(&format!(
            "Average sentiment: {:.2}",
            sentiment.average_score
        )));
    }
    lines.push(String::new());
    for segment in document.segments.iter().take(PDF_SEGMENT_LIMIT) {
        lines.push(pdf_escape(&pdf_line(segment)));
    }
    if document.segments.len() > PDF_SEGMENT_LIMIT {
        lines.push(format!(
            "... truncated to first {} of {} segments",
            PDF_SEGMENT_LIMIT,
            document.segments.len()
        ));
    }

    let mut content = String::from("BT\n/F1 10 Tf\n50 780 Td\n14 TL\n");
    for line in &lines {
        content.push_str(&format!("({}) Tj\nT*\n", line));
    }
    content.push_str("ET\n");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, object) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", index + 1, object));
    }

    let xref_offset = out.len();
    out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for offset in &offsets {
        out.push_str(&format!("{:010} 00000 n \n", offset));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));

    out.into_bytes()
}

/// A rendered export waiting to be downloaded.
#[derive(Debug, Clone)]
pub struct ExportPayload {
    pub video_id: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportPayload {
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.video_id, self.format.extension())
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

struct StoredExport {
    payload: ExportPayload,
    expires_at: Instant,
}

/// Holds rendered exports behind single-use tokens.
pub struct ExportStore {
    entries: RwLock<HashMap<String, StoredExport>>,
    ttl: Duration,
}

impl ExportStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Render the request in the given format and stash the result behind
    /// a fresh token.
    pub fn create_export(&self, request: &ExportRequest, format: ExportFormat) -> Result<String> {
        let bytes = match format {
            ExportFormat::Markdown => render_markdown(request).into_bytes(),
            ExportFormat::Csv => render_csv(request).into_bytes(),
            ExportFormat::Pdf => render_pdf(request),
        };
        let token = Uuid::new_v4().to_string();
        let mut entries = self.entries.write().unwrap();
        entries.insert(
            token.clone(),
            StoredExport {
                payload: ExportPayload {
                    video_id: request.document.video_id.clone(),
                    format,
                    bytes,
                },
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(token)
    }

    /// Redeem a token. The entry is removed whether or not it has expired,
    /// so a token can never be used twice.
    pub fn consume_export(&self, token: &str) -> Result<ExportPayload> {
        let mut entries = self.entries.write().unwrap();
        let Some(stored) = entries.remove(token) else {
            bail!("Unknown or already consumed export token");
        };
        if stored.expires_at <= Instant::now() {
            bail!("Export token expired");
        }
        Ok(stored.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chapter, KeywordEntry, Sentiment, TranscriptSource};

    fn document(count: usize) -> TranscriptDocument {
        let segments = (0..count)
            .map(|i| Segment {
                id: i.to_string(),
                text: format!("Segment {} with a | pipe and \"quotes\"", i),
                start: (i * 10) as f64,
                end: (i * 10 + 5) as f64,
                speaker: if i % 2 == 0 {
                    Some("Alice".to_string())
                } else {
                    None
                },
            })
            .collect();
        TranscriptDocument {
            video_id: "vid-export".to_string(),
            language: "en".to_string(),
            segments,
            source: TranscriptSource::Uploaded,
        }
    }

    fn summary() -> SummaryResponse {
        SummaryResponse {
            short: "• quick take".to_string(),
            medium: "• quick take\n• more".to_string(),
            detailed: "• quick take\n• more\n• even more".to_string(),
            chapters: vec![Chapter {
                title: "Opening".to_string(),
                start: 0.0,
                end: 65.0,
                description: None,
            }],
        }
    }

    fn keywords() -> KeywordResponse {
        KeywordResponse {
            topics: vec![KeywordEntry {
                term: "pipeline".to_string(),
                weight: 4.0,
                sentiment: Some(Sentiment::Neutral),
                tags: None,
            }],
            seo_tags: vec!["pipeline".to_string()],
            overall_tone: Sentiment::Neutral,
        }
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let doc = document(2);
        let output = render_markdown(&ExportRequest::transcript_only(&doc));
        assert!(output.contains("# Transcript: vid-export"));
        assert!(output.contains("\\|"));
        assert!(output.contains("| 00:00 | Alice |"));
        assert!(!output.contains("Truncated"));
    }

    #[test]
    fn test_markdown_includes_analysis_sections() {
        let doc = document(2);
        let summary = summary();
        let keywords = keywords();
        let request = ExportRequest {
            document: &doc,
            summary: Some(&summary),
            keywords: Some(&keywords),
            sentiment: None,
        };
        let output = render_markdown(&request);
        assert!(output.contains("## Summary"));
        assert!(output.contains("- 00:00 to 01:05 Opening"));
        assert!(output.contains("## Keywords"));
        assert!(output.contains("- pipeline (4)"));
        assert!(!output.contains("## Sentiment"));
    }

    #[test]
    fn test_markdown_truncates_past_limit() {
        let doc = document(SEGMENT_LIMIT + 5);
        let output = render_markdown(&ExportRequest::transcript_only(&doc));
        assert!(output.contains("Truncated to the first 500 of 505 segments"));
        // Two header rows plus exactly SEGMENT_LIMIT table rows.
        let rows = output.lines().filter(|l| l.starts_with("| ")).count();
        assert_eq!(rows, SEGMENT_LIMIT + 2);
    }

    #[test]
    fn test_csv_doubles_quotes() {
        let doc = document(1);
        let output = render_csv(&ExportRequest::transcript_only(&doc));
        assert!(output.starts_with("start,end,speaker,text\n"));
        assert!(output.contains("\"\"quotes\"\""));
        assert!(output.contains("\"Alice\""));
    }

    #[test]
    fn test_format_time_minutes_seconds() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(65.9), "01:05");
        assert_eq!(format_time(-3.0), "00:00");
    }

    #[test]
    fn test_pdf_structure() {
        let doc = document(3);
        let bytes = render_pdf(&ExportRequest::transcript_only(&doc));
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("/BaseFont /Helvetica"));
        assert!(text.contains("startxref"));
    }

    #[test]
    fn test_pdf_includes_keyword_line() {
        let doc = document(1);
        let keywords = keywords();
        let request = ExportRequest {
            document: &doc,
            summary: None,
            keywords: Some(&keywords),
            sentiment: None,
        };
        let text = String::from_utf8(render_pdf(&request)).unwrap();
        assert!(text.contains("Keywords: pipeline"));
    }

    #[test]
    fn test_pdf_escapes_parentheses() {
        let mut doc = document(1);
        doc.segments[0].text = "call foo(bar) now".to_string();
        let bytes = render_pdf(&ExportRequest::transcript_only(&doc));
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("foo\\(bar\\)"));
    }

    #[test]
    fn test_export_token_is_single_use() {
        let store = ExportStore::new(Duration::from_secs(60));
        let doc = document(2);
        let token = store
            .create_export(&ExportRequest::transcript_only(&doc), ExportFormat::Markdown)
            .unwrap();
        let payload = store.consume_export(&token).unwrap();
        assert_eq!(payload.format, ExportFormat::Markdown);
        assert_eq!(payload.file_name(), "vid-export.md");
        assert!(store.consume_export(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let store = ExportStore::new(Duration::from_secs(0));
        let doc = document(1);
        let token = store
            .create_export(&ExportRequest::transcript_only(&doc), ExportFormat::Csv)
            .unwrap();
        assert!(store.consume_export(&token).is_err());
    }
}
