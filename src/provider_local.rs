//! Local deterministic analysis provider.
//!
//! Heuristic backend that needs no network or API key: sentence-capped
//! bullet summaries, quarter-split chapters, frequency-ranked keywords with
//! a small sentiment lexicon, chunk-derived mind maps, relevance-selected
//! Q&A, chunked sentiment timelines, and structured templates. Useful as
//! the default runtime and as the deterministic baseline in tests.

use anyhow::Result;
use async_trait::async_trait;

use crate::chunk::chunk_transcript;
use crate::config::Config;
use crate::models::{
    Chapter, Chunk, KeywordEntry, KeywordResponse, MindMapNode, QaResult, Segment, Sentiment,
    SentimentPoint, SentimentTimeline, SummaryLength, SummaryResponse, TemplateKind,
    TemplateOutput,
};
use crate::provider::{AnalysisProvider, AnalyzeInput, Capabilities};
use crate::relevance::select_relevant_chunks;

const POSITIVE_WORDS: &[&str] = &["good", "great", "excellent", "positive", "benefit", "improve"];
const NEGATIVE_WORDS: &[&str] = &["bad", "poor", "negative", "risk", "issue", "problem"];

/// Word-lexicon tone classification: +1 per positive word present, -1 per
/// negative word present, sign of the total decides the label.
fn to_sentiment(text: &str) -> Sentiment {
    let normalized = text.to_lowercase();
    let mut score = 0i32;
    for word in POSITIVE_WORDS {
        if normalized.contains(word) {
            score += 1;
        }
    }
    for word in NEGATIVE_WORDS {
        if normalized.contains(word) {
            score -= 1;
        }
    }
    match score.cmp(&0) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

fn joined_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_summary(segments: &[Segment], length: SummaryLength) -> String {
    let text = joined_text(segments);
    let limit = match length {
        SummaryLength::Short => 3,
        SummaryLength::Medium => 6,
        SummaryLength::Detailed => 10,
    };
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .take(limit)
        .map(|sentence| format!("• {}", sentence))
        .collect::<Vec<_>>()
        .join("\n")
}

fn first_words(text: &str, count: usize) -> String {
    text.split_whitespace()
        .take(count)
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_chapters(segments: &[Segment]) -> Vec<Chapter> {
    let total = segments.len();
    if total == 0 {
        return Vec::new();
    }
    let slice_size = std::cmp::max(1, total / 4);
    let mut chapters = Vec::new();
    let mut index = 0;
    while index < total {
        let slice = &segments[index..std::cmp::min(index + slice_size, total)];
        let text = joined_text(slice);
        let title = {
            let head = first_words(&text, 6);
            if head.is_empty() {
                format!("Chapter {}", chapters.len() + 1)
            } else {
                head
            }
        };
        chapters.push(Chapter {
            title,
            start: slice.first().map(|s| s.start).unwrap_or(0.0),
            end: slice
                .last()
                .map(|s| s.end)
                .or_else(|| slice.first().map(|s| s.start))
                .unwrap_or(0.0),
            description: Some(text.chars().take(180).collect()),
        });
        index += slice_size;
    }
    chapters
}

fn compute_keywords(segments: &[Segment]) -> KeywordResponse {
    let text = segments
        .iter()
        .map(|s| s.text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    // Count tokens longer than three characters, remembering first-seen
    // order so equal counts rank deterministically.
    let mut order: Vec<String> = Vec::new();
    let mut counts: std::collections::HashMap<String, u64> = std::collections::HashMap::new();
    for token in text
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .filter(|token| token.len() > 3)
    {
        let entry = counts.entry(token.to_string()).or_insert(0);
        if *entry == 0 {
            order.push(token.to_string());
        }
        *entry += 1;
    }

    let mut ranked: Vec<(String, u64)> = order
        .into_iter()
        .map(|term| {
            let count = counts[&term];
            (term, count)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(12);

    let topics: Vec<KeywordEntry> = ranked
        .into_iter()
        .map(|(term, count)| {
            let sentiment = to_sentiment(&term);
            KeywordEntry {
                term,
                weight: count as f64,
                sentiment: Some(sentiment),
                tags: None,
            }
        })
        .collect();

    KeywordResponse {
        seo_tags: topics.iter().take(6).map(|t| t.term.clone()).collect(),
        overall_tone: to_sentiment(&text),
        topics,
    }
}

fn build_mind_map(segments: &[Segment], chunk_size: usize) -> MindMapNode {
    let chunks = chunk_transcript(segments, chunk_size);
    let children: Vec<MindMapNode> = chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| {
            let head = first_words(&chunk.text, 6);
            MindMapNode {
                id: format!("chunk-{}", index),
                label: if head.is_empty() {
                    format!("Section {}", index + 1)
                } else {
                    head
                },
                start: Some(chunk.start),
                end: Some(chunk.end),
                children: Vec::new(),
            }
        })
        .collect();

    MindMapNode {
        id: "video-overview".to_string(),
        label: "Video Overview".to_string(),
        start: None,
        end: None,
        children,
    }
}

/// Collect the source segments behind a set of selected chunks, in chunk
/// order. A segment referenced by two chunks appears twice, matching the
/// provenance list callers display per chunk.
fn chunk_sources(segments: &[Segment], chunks: &[Chunk]) -> Vec<Segment> {
    chunks
        .iter()
        .flat_map(|chunk| {
            segments
                .iter()
                .filter(|segment| chunk.segment_ids.contains(&segment.id))
                .cloned()
                .collect::<Vec<_>>()
        })
        .collect()
}

fn answer_from_chunks(
    segments: &[Segment],
    chunks: &[Chunk],
    question: &str,
    limit: usize,
) -> QaResult {
    let relevant = select_relevant_chunks(chunks, question, limit);
    let answer = relevant
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    QaResult {
        question: question.to_string(),
        answer: if answer.is_empty() {
            "No answer found in transcript.".to_string()
        } else {
            answer
        },
        sources: chunk_sources(segments, &relevant),
    }
}

fn build_template(segments: &[Segment], kind: TemplateKind) -> TemplateOutput {
    let text = joined_text(segments);
    match kind {
        TemplateKind::Recipe => {
            let mut seen = std::collections::HashSet::new();
            let ingredients: Vec<String> = text
                .to_lowercase()
                .chars()
                .map(|c| if c.is_ascii_alphabetic() { c } else { ' ' })
                .collect::<String>()
                .split_whitespace()
                .filter(|word| seen.insert(word.to_string()))
                .take(10)
                .map(|word| word.to_string())
                .collect();
            let steps: Vec<String> = text
                .split(['.', '!', '?'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .take(6)
                .map(|s| s.to_string())
                .collect();
            TemplateOutput {
                kind,
                summary: "Auto-generated cooking summary".to_string(),
                content: serde_json::json!({
                    "ingredients": ingredients,
                    "steps": steps,
                }),
            }
        }
        TemplateKind::Education => {
            let flashcards: Vec<serde_json::Value> = segments
                .iter()
                .take(5)
                .map(|segment| {
                    serde_json::json!({
                        "question": format!("Explain: {}", segment.text.chars().take(50).collect::<String>()),
                        "answer": segment.text,
                    })
                })
                .collect();
            let quiz: Vec<serde_json::Value> = segments
                .iter()
                .take(5)
                .enumerate()
                .map(|(index, segment)| {
                    serde_json::json!({
                        "question": format!("What is the key idea in part {}?", index + 1),
                        "answer": segment.text,
                    })
                })
                .collect();
            TemplateOutput {
                kind,
                summary: "Education recap".to_string(),
                content: serde_json::json!({
                    "flashcards": flashcards,
                    "quiz": quiz,
                }),
            }
        }
        TemplateKind::Meeting => {
            let decisions: Vec<&str> = segments.iter().take(5).map(|s| s.text.as_str()).collect();
            let actions: Vec<&str> = segments
                .iter()
                .skip(5)
                .take(5)
                .map(|s| s.text.as_str())
                .collect();
            TemplateOutput {
                kind,
                summary: "Meeting highlights".to_string(),
                content: serde_json::json!({
                    "decisions": decisions,
                    "actions": actions,
                }),
            }
        }
    }
}

/// Heuristic provider with no external dependencies.
pub struct LocalProvider {
    mind_map_chunk_size: usize,
    sentiment_chunk_size: usize,
    qa_chunk_size: usize,
    qa_limit: usize,
}

impl LocalProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            mind_map_chunk_size: config.chunking.mind_map_size,
            sentiment_chunk_size: config.chunking.sentiment_size,
            qa_chunk_size: config.chunking.qa_local_size,
            qa_limit: config.retrieval.qa_local_limit,
        }
    }
}

#[async_trait]
impl AnalysisProvider for LocalProvider {
    fn name(&self) -> &str {
        "local"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            sentiment_timeline: true,
            heatmap: false,
            templates: true,
        }
    }

    async fn summarize(
        &self,
        input: &AnalyzeInput,
        _length: SummaryLength,
    ) -> Result<SummaryResponse> {
        Ok(SummaryResponse {
            short: build_summary(&input.segments, SummaryLength::Short),
            medium: build_summary(&input.segments, SummaryLength::Medium),
            detailed: build_summary(&input.segments, SummaryLength::Detailed),
            chapters: build_chapters(&input.segments),
        })
    }

    async fn mind_map(&self, input: &AnalyzeInput) -> Result<MindMapNode> {
        Ok(build_mind_map(&input.segments, self.mind_map_chunk_size))
    }

    async fn keywords(&self, input: &AnalyzeInput) -> Result<KeywordResponse> {
        Ok(compute_keywords(&input.segments))
    }

    async fn qa(&self, input: &AnalyzeInput, question: &str) -> Result<QaResult> {
        let chunks = chunk_transcript(&input.segments, self.qa_chunk_size);
        Ok(answer_from_chunks(
            &input.segments,
            &chunks,
            question,
            self.qa_limit,
        ))
    }

    async fn sentiment_timeline(&self, input: &AnalyzeInput) -> Result<SentimentTimeline> {
        let chunks = chunk_transcript(&input.segments, self.sentiment_chunk_size);
        let points: Vec<SentimentPoint> = chunks
            .iter()
            .map(|chunk| {
                let label = to_sentiment(&chunk.text);
                let score = match label {
                    Sentiment::Positive => 1.0,
                    Sentiment::Negative => -1.0,
                    Sentiment::Neutral => 0.0,
                };
                SentimentPoint {
                    time: chunk.start,
                    score,
                    label,
                }
            })
            .collect();
        let average_score = if points.is_empty() {
            0.0
        } else {
            points.iter().map(|p| p.score).sum::<f64>() / points.len() as f64
        };
        Ok(SentimentTimeline {
            average_score,
            points,
        })
    }

    async fn templates(&self, input: &AnalyzeInput, kind: TemplateKind) -> Result<TemplateOutput> {
        Ok(build_template(&input.segments, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TranscriptDocument, TranscriptSource};

    fn segment(id: usize, text: &str) -> Segment {
        Segment {
            id: id.to_string(),
            text: text.to_string(),
            start: (id * 10) as f64,
            end: (id * 10 + 5) as f64,
            speaker: None,
        }
    }

    fn input_from(texts: &[&str]) -> AnalyzeInput {
        let segments: Vec<Segment> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| segment(i, t))
            .collect();
        AnalyzeInput::from_document(&TranscriptDocument {
            video_id: "vid".to_string(),
            language: "en".to_string(),
            segments,
            source: TranscriptSource::Uploaded,
        })
    }

    fn provider() -> LocalProvider {
        LocalProvider::new(&Config::default())
    }

    #[test]
    fn test_sentiment_lexicon() {
        assert_eq!(to_sentiment("this is a great benefit"), Sentiment::Positive);
        assert_eq!(to_sentiment("a bad problem and a risk"), Sentiment::Negative);
        assert_eq!(to_sentiment("good but one issue"), Sentiment::Neutral);
        // Lexicon matching is by containment: "risky" hits the "risk" entry.
        assert_eq!(to_sentiment("good but risky: one issue"), Sentiment::Negative);
        assert_eq!(to_sentiment("nothing notable"), Sentiment::Neutral);
    }

    #[test]
    fn test_summary_caps_sentences_per_length() {
        let segments: Vec<Segment> = (0..12)
            .map(|i| segment(i, &format!("Sentence number {}.", i)))
            .collect();
        assert_eq!(
            build_summary(&segments, SummaryLength::Short).lines().count(),
            3
        );
        assert_eq!(
            build_summary(&segments, SummaryLength::Medium).lines().count(),
            6
        );
        assert_eq!(
            build_summary(&segments, SummaryLength::Detailed)
                .lines()
                .count(),
            10
        );
        assert!(build_summary(&segments, SummaryLength::Short).starts_with("• "));
    }

    #[test]
    fn test_chapters_cover_quarters() {
        let segments: Vec<Segment> = (0..8)
            .map(|i| segment(i, &format!("Part {} content here", i)))
            .collect();
        let chapters = build_chapters(&segments);
        assert_eq!(chapters.len(), 4);
        assert_eq!(chapters[0].start, 0.0);
        assert_eq!(chapters[0].end, 15.0);
        assert_eq!(chapters[3].end, 75.0);
    }

    #[test]
    fn test_keywords_ranked_by_frequency() {
        let input = input_from(&[
            "deployment deployment deployment pipeline",
            "pipeline deployment testing",
        ]);
        let keywords = compute_keywords(&input.segments);
        assert_eq!(keywords.topics[0].term, "deployment");
        assert_eq!(keywords.topics[0].weight, 4.0);
        assert_eq!(keywords.topics[1].term, "pipeline");
        assert!(keywords.seo_tags.contains(&"deployment".to_string()));
    }

    #[test]
    fn test_keywords_skip_short_tokens() {
        let input = input_from(&["the cat and dog ran far away today"]);
        let keywords = compute_keywords(&input.segments);
        assert!(keywords.topics.iter().all(|t| t.term.len() > 3));
    }

    #[tokio::test]
    async fn test_mind_map_children_come_from_chunks() {
        let input = input_from(&["alpha topic", "beta topic", "gamma topic"]);
        let map = provider().mind_map(&input).await.unwrap();
        assert_eq!(map.label, "Video Overview");
        assert!(!map.children.is_empty());
        assert_eq!(map.children[0].id, "chunk-0");
        assert_eq!(map.children[0].start, Some(0.0));
    }

    #[tokio::test]
    async fn test_qa_returns_relevant_sources() {
        let input = input_from(&[
            "we discussed the deployment pipeline",
            "lunch was nice",
            "deployment happens on fridays",
        ]);
        let result = provider().qa(&input, "deployment").await.unwrap();
        assert!(result.answer.to_lowercase().contains("deployment"));
        assert!(!result.sources.is_empty());
        assert!(result
            .sources
            .iter()
            .any(|s| s.text.contains("deployment")));
    }

    #[tokio::test]
    async fn test_qa_without_match_reports_no_answer() {
        let input = input_from(&["nothing relevant at all"]);
        let result = provider().qa(&input, "quantum").await.unwrap();
        assert_eq!(result.answer, "No answer found in transcript.");
        assert!(result.sources.is_empty());
    }

    #[tokio::test]
    async fn test_sentiment_timeline_scores() {
        let input = input_from(&["this is great and excellent", "a bad problem arose"]);
        // Force each segment into its own chunk.
        let provider = LocalProvider {
            mind_map_chunk_size: 800,
            sentiment_chunk_size: 10,
            qa_chunk_size: 1000,
            qa_limit: 3,
        };
        let timeline = provider.sentiment_timeline(&input).await.unwrap();
        assert_eq!(timeline.points.len(), 2);
        assert_eq!(timeline.points[0].score, 1.0);
        assert_eq!(timeline.points[1].score, -1.0);
        assert_eq!(timeline.average_score, 0.0);
    }

    #[tokio::test]
    async fn test_meeting_template_shape() {
        let input = input_from(&["a", "b", "c", "d", "e", "f", "g"]);
        let output = provider()
            .templates(&input, TemplateKind::Meeting)
            .await
            .unwrap();
        assert_eq!(output.kind, TemplateKind::Meeting);
        assert_eq!(output.content["decisions"].as_array().unwrap().len(), 5);
        assert_eq!(output.content["actions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_recipe_template_unique_ingredients() {
        let input = input_from(&["mix flour and flour with sugar. Bake the mix."]);
        let output = provider()
            .templates(&input, TemplateKind::Recipe)
            .await
            .unwrap();
        let ingredients = output.content["ingredients"].as_array().unwrap();
        let terms: Vec<&str> = ingredients.iter().map(|v| v.as_str().unwrap()).collect();
        let unique: std::collections::HashSet<&str> = terms.iter().copied().collect();
        assert_eq!(terms.len(), unique.len());
        assert!(terms.contains(&"flour"));
    }

    #[test]
    fn test_heatmap_unsupported() {
        let caps = provider().capabilities();
        assert!(!caps.heatmap);
        assert!(caps.sentiment_timeline);
        assert!(caps.templates);
    }
}
