//! Analysis provider abstraction and registry.
//!
//! Defines the [`AnalysisProvider`] trait that all analysis backends
//! implement, the [`AnalyzeInput`] handed to every operation, and the
//! [`ProviderRegistry`] that resolves runtime names to cached provider
//! instances.
//!
//! Required operations (`summarize`, `mind_map`, `keywords`, `qa`) are
//! implemented by every backend. Optional operations (`sentiment_timeline`,
//! `heatmap`, `templates`) default to a typed [`ProviderError::Unsupported`]
//! failure; callers can consult [`AnalysisProvider::capabilities`] before
//! invoking them.
//!
//! # Provider Resolution
//!
//! | Runtime | Backend |
//! |---------|---------|
//! | `openai` (with `OPENAI_API_KEY`) | Remote OpenAI chat API |
//! | `gemini` (with `GEMINI_API_KEY`) | Remote Gemini API |
//! | anything else | Local deterministic heuristics |

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::Result;
use async_trait::async_trait;

use crate::config::Config;
use crate::models::{
    HeatmapPoint, KeywordResponse, MindMapNode, QaResult, Segment, SentimentTimeline,
    SummaryLength, SummaryResponse, TemplateKind, TemplateOutput, TranscriptDocument,
};
use crate::provider_local::LocalProvider;
use crate::provider_remote::RemoteProvider;
use crate::segments::{normalize_segments, transcript_to_text};

/// Typed failures a provider can raise beyond transport errors.
#[derive(Debug)]
pub enum ProviderError {
    /// The provider does not implement this optional operation.
    Unsupported(&'static str),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Unsupported(op) => {
                write!(f, "operation '{}' not supported by this provider", op)
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Which optional operations a provider implements.
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    pub sentiment_timeline: bool,
    pub heatmap: bool,
    pub templates: bool,
}

/// Normalized per-request view of a transcript, built once and shared by
/// every operation in a request.
#[derive(Debug, Clone)]
pub struct AnalyzeInput {
    pub video_id: String,
    pub language: String,
    pub segments: Vec<Segment>,
    pub transcript: String,
}

impl AnalyzeInput {
    /// Build the input from a document: normalize segments and render the
    /// timestamped transcript text providers embed in prompts.
    pub fn from_document(document: &TranscriptDocument) -> Self {
        let segments = normalize_segments(&document.segments);
        let normalized = TranscriptDocument {
            video_id: document.video_id.clone(),
            language: document.language.clone(),
            segments: segments.clone(),
            source: document.source,
        };
        Self {
            video_id: document.video_id.clone(),
            language: document.language.clone(),
            transcript: transcript_to_text(&normalized),
            segments,
        }
    }
}

/// An analysis backend: local heuristics or a remote model.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Runtime name this provider was registered under.
    fn name(&self) -> &str;

    /// Which optional operations this backend supports.
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    async fn summarize(
        &self,
        input: &AnalyzeInput,
        length: SummaryLength,
    ) -> Result<SummaryResponse>;

    async fn mind_map(&self, input: &AnalyzeInput) -> Result<MindMapNode>;

    async fn keywords(&self, input: &AnalyzeInput) -> Result<KeywordResponse>;

    async fn qa(&self, input: &AnalyzeInput, question: &str) -> Result<QaResult>;

    async fn sentiment_timeline(&self, _input: &AnalyzeInput) -> Result<SentimentTimeline> {
        Err(ProviderError::Unsupported("sentimentTimeline").into())
    }

    async fn heatmap(&self, _input: &AnalyzeInput) -> Result<Vec<HeatmapPoint>> {
        Err(ProviderError::Unsupported("heatmap").into())
    }

    async fn templates(
        &self,
        _input: &AnalyzeInput,
        _kind: TemplateKind,
    ) -> Result<TemplateOutput> {
        Err(ProviderError::Unsupported("templates").into())
    }
}

/// Registry resolving runtime names to provider instances.
///
/// Passed explicitly through the call path (no process-global state), so
/// tests can build isolated registries. Instances are cached by runtime
/// name: the first resolution constructs the provider, later ones reuse it.
pub struct ProviderRegistry {
    config: Config,
    providers: RwLock<HashMap<String, Arc<dyn AnalysisProvider>>>,
}

impl ProviderRegistry {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            providers: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a provider for the given runtime, falling back to the
    /// configured default and finally to the local heuristics when the
    /// requested remote backend has no API key.
    pub fn resolve(&self, runtime_override: Option<&str>) -> Arc<dyn AnalysisProvider> {
        let runtime = runtime_override
            .unwrap_or(&self.config.provider.runtime)
            .to_lowercase();

        if let Some(provider) = self.providers.read().unwrap().get(&runtime) {
            return provider.clone();
        }

        let remote = match runtime.as_str() {
            "openai" => RemoteProvider::openai(&self.config).ok(),
            "gemini" => RemoteProvider::gemini(&self.config).ok(),
            _ => None,
        };
        let provider: Arc<dyn AnalysisProvider> = match remote {
            Some(remote) => Arc::new(remote),
            None => Arc::new(LocalProvider::new(&self.config)),
        };

        self.providers
            .write()
            .unwrap()
            .insert(runtime, provider.clone());
        provider
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
