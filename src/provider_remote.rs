//! Remote LLM analysis provider.
//!
//! Calls a hosted chat-completion API (OpenAI or Gemini) with the prompt
//! builders from [`crate::prompts`], expecting JSON back, and parses the
//! response with lenient defaults so a partially-shaped reply still yields
//! a usable result.
//!
//! # Retry Strategy
//!
//! Transient errors are retried with exponential backoff:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use crate::chunk::chunk_transcript;
use crate::config::Config;
use crate::models::{
    Chapter, KeywordEntry, KeywordResponse, MindMapNode, QaResult, Segment, Sentiment,
    SummaryLength, SummaryResponse, TemplateKind, TemplateOutput,
};
use crate::prompts;
use crate::provider::{AnalysisProvider, AnalyzeInput, Capabilities};
use crate::relevance::select_relevant_chunks;

const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Which hosted API the provider talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    OpenAi,
    Gemini,
}

/// LLM-backed provider. One instance per backend, created by the registry
/// when the corresponding API key is present.
pub struct RemoteProvider {
    backend: Backend,
    api_key: String,
    model: String,
    timeout_secs: u64,
    max_retries: u32,
    qa_chunk_size: usize,
    qa_limit: usize,
}

impl RemoteProvider {
    /// Build an OpenAI-backed provider. Requires `OPENAI_API_KEY`.
    pub fn openai(config: &Config) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;
        let model = config
            .provider
            .model
            .clone()
            .or_else(|| std::env::var("OPENAI_MODEL").ok())
            .unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string());
        Ok(Self::build(Backend::OpenAi, api_key, model, config))
    }

    /// Build a Gemini-backed provider. Requires `GEMINI_API_KEY`.
    pub fn gemini(config: &Config) -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY environment variable not set"))?;
        let model = config
            .provider
            .model
            .clone()
            .or_else(|| std::env::var("GEMINI_MODEL").ok())
            .unwrap_or_else(|| GEMINI_DEFAULT_MODEL.to_string());
        Ok(Self::build(Backend::Gemini, api_key, model, config))
    }

    fn build(backend: Backend, api_key: String, model: String, config: &Config) -> Self {
        Self {
            backend,
            api_key,
            model,
            timeout_secs: config.provider.timeout_secs,
            max_retries: config.provider.max_retries,
            qa_chunk_size: config.chunking.qa_remote_size,
            qa_limit: config.retrieval.qa_remote_limit,
        }
    }

    /// Send a prompt and return the parsed JSON object from the reply.
    async fn run_prompt(&self, prompt: &str) -> Result<serde_json::Value> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()?;

        let (url, body) = match self.backend {
            Backend::OpenAi => (
                "https://api.openai.com/v1/chat/completions".to_string(),
                serde_json::json!({
                    "model": self.model,
                    "messages": [{ "role": "user", "content": prompt }],
                    "response_format": { "type": "json_object" },
                }),
            ),
            Backend::Gemini => (
                format!(
                    "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
                    self.model, self.api_key
                ),
                serde_json::json!({
                    "contents": [{ "parts": [{ "text": prompt }] }],
                    "generationConfig": { "responseMimeType": "application/json" },
                }),
            ),
        };

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let mut request = client.post(&url).json(&body);
            if self.backend == Backend::OpenAi {
                request = request.header("Authorization", format!("Bearer {}", self.api_key));
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return self.extract_json(&json);
                    }

                    // Rate limited or server error — retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(anyhow::anyhow!(
                            "{} API error {}: {}",
                            self.name(),
                            status,
                            body_text
                        ));
                        continue;
                    }

                    // Client error (not 429) — don't retry
                    let body_text = response.text().await.unwrap_or_default();
                    bail!("{} API error {}: {}", self.name(), status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Analysis request failed after retries")))
    }

    /// Pull the JSON payload out of the backend's response envelope.
    fn extract_json(&self, response: &serde_json::Value) -> Result<serde_json::Value> {
        let text = match self.backend {
            Backend::OpenAi => response["choices"][0]["message"]["content"]
                .as_str()
                .context("Invalid OpenAI response: missing message content")?,
            Backend::Gemini => response["candidates"][0]["content"]["parts"][0]["text"]
                .as_str()
                .context("Invalid Gemini response: missing candidate text")?,
        };
        serde_json::from_str(text).context("Model reply was not valid JSON")
    }
}

fn str_or<'a>(value: &'a serde_json::Value, key: &str, fallback: &'a str) -> String {
    value[key]
        .as_str()
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Map a reply object to a [`SummaryResponse`], cascading missing lengths
/// down to the next shorter one so the caller always gets text.
fn to_summary_response(value: serde_json::Value) -> SummaryResponse {
    let short = str_or(&value, "short", "");
    let medium = str_or(&value, "medium", &short);
    let detailed = str_or(&value, "detailed", &medium);
    let chapters = value["chapters"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| Chapter {
                    title: str_or(item, "title", "Untitled chapter"),
                    start: item["start"].as_f64().unwrap_or(0.0),
                    end: item["end"].as_f64().unwrap_or(0.0),
                    description: item["description"].as_str().map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default();
    SummaryResponse {
        short,
        medium,
        detailed,
        chapters,
    }
}

fn to_sentiment_label(value: &serde_json::Value) -> Option<Sentiment> {
    match value.as_str() {
        Some("positive") => Some(Sentiment::Positive),
        Some("negative") => Some(Sentiment::Negative),
        Some("neutral") => Some(Sentiment::Neutral),
        _ => None,
    }
}

fn to_keyword_response(value: serde_json::Value) -> KeywordResponse {
    let topics: Vec<KeywordEntry> = value["topics"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let term = item["term"].as_str()?.to_string();
                    Some(KeywordEntry {
                        term,
                        weight: item["weight"].as_f64().unwrap_or(1.0),
                        sentiment: to_sentiment_label(&item["sentiment"]),
                        tags: item["tags"].as_array().map(|tags| {
                            tags.iter()
                                .filter_map(|t| t.as_str().map(str::to_string))
                                .collect()
                        }),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    let seo_tags = value["seoTags"]
        .as_array()
        .map(|tags| {
            tags.iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_else(|| topics.iter().take(6).map(|t| t.term.clone()).collect());
    KeywordResponse {
        seo_tags,
        overall_tone: to_sentiment_label(&value["overallTone"]).unwrap_or(Sentiment::Neutral),
        topics,
    }
}

fn to_mind_map(value: &serde_json::Value, fallback_id: &str) -> MindMapNode {
    MindMapNode {
        id: str_or(value, "id", fallback_id),
        label: str_or(value, "label", "Untitled"),
        start: value["start"].as_f64(),
        end: value["end"].as_f64(),
        children: value["children"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .map(|(index, child)| to_mind_map(child, &format!("node-{}", index)))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Collect the source segments behind the retrieved chunks, in chunk
/// order. The model answers from these chunks, so they are the citations
/// regardless of what the reply claims.
fn qa_sources(segments: &[Segment], chunks: &[crate::models::Chunk]) -> Vec<Segment> {
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

#[async_trait]
impl AnalysisProvider for RemoteProvider {
    fn name(&self) -> &str {
        match self.backend {
            Backend::OpenAi => "openai",
            Backend::Gemini => "gemini",
        }
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            sentiment_timeline: false,
            heatmap: false,
            templates: true,
        }
    }

    async fn summarize(
        &self,
        input: &AnalyzeInput,
        length: SummaryLength,
    ) -> Result<SummaryResponse> {
        let prompt = prompts::summary_prompt(&input.transcript, length, &input.language);
        let reply = self.run_prompt(&prompt).await?;
        Ok(to_summary_response(reply))
    }

    async fn mind_map(&self, input: &AnalyzeInput) -> Result<MindMapNode> {
        let prompt = prompts::mind_map_prompt(&input.transcript, &input.language);
        let reply = self.run_prompt(&prompt).await?;
        Ok(to_mind_map(&reply, "root"))
    }

    async fn keywords(&self, input: &AnalyzeInput) -> Result<KeywordResponse> {
        let prompt = prompts::keyword_prompt(&input.transcript, &input.language);
        let reply = self.run_prompt(&prompt).await?;
        Ok(to_keyword_response(reply))
    }

    async fn qa(&self, input: &AnalyzeInput, question: &str) -> Result<QaResult> {
        // Send only the most relevant chunks, not the whole transcript.
        let chunks = chunk_transcript(&input.segments, self.qa_chunk_size);
        let relevant = select_relevant_chunks(&chunks, question, self.qa_limit);
        let context = relevant
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = prompts::qa_prompt(&context, &input.language, question);
        let reply = self.run_prompt(&prompt).await?;
        Ok(QaResult {
            question: question.to_string(),
            answer: str_or(&reply, "answer", "No answer found in transcript."),
            sources: qa_sources(&input.segments, &relevant),
        })
    }

    async fn templates(&self, input: &AnalyzeInput, kind: TemplateKind) -> Result<TemplateOutput> {
        let prompt = prompts::template_prompt(&input.transcript, &input.language, kind);
        let reply = self.run_prompt(&prompt).await?;
        let summary = str_or(&reply, "summary", "Generated from transcript");
        let content = reply
            .get("content")
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        Ok(TemplateOutput {
            kind,
            summary,
            content,
        })
    }
}
