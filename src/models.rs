//! Core data models used throughout transcript-insights.
//!
//! These types represent the transcript documents, chunks, detections, and
//! analysis results that flow through the chunking and provider pipeline.
//! Wire names are camelCase to match the JSON shape remote providers and
//! exports use.

use serde::{Deserialize, Serialize};

/// Atomic timed span of transcript text with optional speaker attribution.
///
/// Times are seconds from the start of the recording. `end >= start` is
/// expected but not enforced; the normalizer passes times through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

/// Where a transcript came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptSource {
    Uploaded,
    Youtube,
}

/// A full transcript: ordered segments plus identity and language metadata.
///
/// After normalization, segments are stored in non-decreasing `start` order.
/// `language` is an ISO 639-1 code, or `"auto"` before resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptDocument {
    pub video_id: String,
    pub language: String,
    pub segments: Vec<Segment>,
    pub source: TranscriptSource,
}

/// A size-bounded aggregation of consecutive segments, the unit of analysis
/// for providers.
///
/// `segment_ids` is non-empty and preserves source segment order; `start` is
/// the start of the first contributing segment and `end` the end of the last
/// (or of the prior segment when the chunk closed early on overflow).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub segment_ids: Vec<String>,
}

/// Coarse confidence bucket derived from a detection confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reliability {
    High,
    Medium,
    Low,
}

/// Result of language detection: ISO 639-1 code, confidence in `[0, 1]`,
/// and the reliability band derived from that confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageDetection {
    pub language: String,
    pub confidence: f64,
    pub reliability: Reliability,
}

/// Requested summary verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    Medium,
    Detailed,
}

impl SummaryLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Detailed => "detailed",
        }
    }
}

/// An auto-generated chapter marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    pub start: f64,
    pub end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Summaries at all three lengths plus chapter markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub short: String,
    pub medium: String,
    pub detailed: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

/// A node in the hierarchical mind map. Timestamps are optional; leaf
/// sections produced from chunks carry the chunk's time range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MindMapNode {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(default)]
    pub children: Vec<MindMapNode>,
}

/// Tone label used for keywords and sentiment points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// A weighted keyword with optional tone and tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub term: String,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Keyword extraction result: ranked topics, SEO tags, and overall tone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordResponse {
    pub topics: Vec<KeywordEntry>,
    pub seo_tags: Vec<String>,
    pub overall_tone: Sentiment,
}

/// Answer to a free-text question, with the contributing source segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaResult {
    pub question: String,
    pub answer: String,
    pub sources: Vec<Segment>,
}

/// One point on the sentiment timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentPoint {
    pub time: f64,
    pub score: f64,
    pub label: Sentiment,
}

/// Sentiment over time, with the mean score across all points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentTimeline {
    pub average_score: f64,
    pub points: Vec<SentimentPoint>,
}

/// One point on the engagement heatmap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapPoint {
    pub time: f64,
    pub intensity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Structured template flavors providers can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Recipe,
    Education,
    Meeting,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Recipe => "recipe",
            TemplateKind::Education => "education",
            TemplateKind::Meeting => "meeting",
        }
    }
}

/// A rendered structured template: free-form content under a known kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateOutput {
    pub kind: TemplateKind,
    pub summary: String,
    pub content: serde_json::Value,
}

/// Supported export document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Pdf,
    Csv,
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Csv => "text/csv",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Csv => "csv",
        }
    }
}
