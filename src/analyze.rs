//! Analysis orchestration.
//!
//! [`Analyzer`] ties the pieces together: it normalizes incoming segments
//! into a stored [`TranscriptDocument`], resolves the provider for a
//! request, checks capabilities before optional operations, and caches
//! every derived result under a `videoId:language:operation` key so repeat
//! requests skip the provider entirely.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::export::{ExportPayload, ExportRequest, ExportStore};
use crate::language::detect_language_segments;
use crate::models::{
    ExportFormat, HeatmapPoint, KeywordResponse, MindMapNode, QaResult, Segment,
    SentimentTimeline, SummaryLength, SummaryResponse, TemplateKind, TemplateOutput,
    TranscriptDocument, TranscriptSource,
};
use crate::provider::{AnalysisProvider, AnalyzeInput, ProviderRegistry};
use crate::segments::normalize_segments;
use crate::store::{AnalysisCache, CacheKey, TranscriptStore};

pub struct Analyzer {
    config: Config,
    registry: ProviderRegistry,
    cache: AnalysisCache,
    transcripts: TranscriptStore,
    exports: ExportStore,
}

impl Analyzer {
    pub fn new(config: Config) -> Self {
        let cache = AnalysisCache::new(Duration::from_secs(config.cache.analysis_ttl_secs));
        let transcripts =
            TranscriptStore::new(Duration::from_secs(config.cache.transcript_ttl_secs));
        let exports = ExportStore::new(Duration::from_secs(config.cache.export_ttl_secs));
        let registry = ProviderRegistry::new(config.clone());
        Self {
            config,
            registry,
            cache,
            transcripts,
            exports,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Normalize raw segments into a stored document. A language of
    /// `"auto"` (or empty) is replaced by the detected language of the
    /// combined segment text.
    pub fn build_document(
        &self,
        video_id: &str,
        language: &str,
        segments: Vec<Segment>,
        source: TranscriptSource,
    ) -> Result<TranscriptDocument> {
        if segments.is_empty() {
            bail!("Transcript has no segments");
        }
        let segments = normalize_segments(&segments);
        let language = if language.is_empty() || language.eq_ignore_ascii_case("auto") {
            detect_language_segments(&segments).language
        } else {
            language.to_string()
        };
        let document = TranscriptDocument {
            video_id: video_id.to_string(),
            language,
            segments,
            source,
        };
        self.transcripts.save(&document);
        Ok(document)
    }

    pub fn get_transcript(&self, video_id: &str, language: &str) -> Option<TranscriptDocument> {
        self.transcripts.get(video_id, language)
    }

    /// Render an export and stash the result behind a single-use token.
    pub fn create_export(&self, request: &ExportRequest, format: ExportFormat) -> Result<String> {
        self.exports.create_export(request, format)
    }

    /// Redeem an export token; each token works exactly once.
    pub fn consume_export(&self, token: &str) -> Result<ExportPayload> {
        self.exports.consume_export(token)
    }

    fn cache_key(
        &self,
        document: &TranscriptDocument,
        operation: &str,
        runtime: Option<&str>,
    ) -> CacheKey {
        // Runtime overrides get their own cache slot so switching backends
        // never serves another backend's result.
        let operation = match runtime {
            Some(runtime) => format!("{}:{}", operation, runtime.to_lowercase()),
            None => operation.to_string(),
        };
        CacheKey {
            video_id: document.video_id.clone(),
            language: document.language.clone(),
            operation,
        }
    }

    /// Cache-through helper shared by every operation: return the cached
    /// value when present, otherwise run the provider call and store its
    /// result.
    async fn cached<T, F, Fut>(&self, key: CacheKey, run: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        if let Some(value) = self.cache.get(&key) {
            if let Ok(decoded) = serde_json::from_value(value) {
                return Ok(decoded);
            }
        }
        let result = run().await?;
        self.cache.set(&key, serde_json::to_value(&result)?);
        Ok(result)
    }

    fn provider_for(&self, runtime: Option<&str>) -> Arc<dyn AnalysisProvider> {
        self.registry.resolve(runtime)
    }

    pub async fn get_summary(
        &self,
        document: &TranscriptDocument,
        length: SummaryLength,
        runtime: Option<&str>,
    ) -> Result<SummaryResponse> {
        let key = self.cache_key(document, &format!("summary:{}", length.as_str()), runtime);
        let provider = self.provider_for(runtime);
        let input = AnalyzeInput::from_document(document);
        self.cached(key, || async move { provider.summarize(&input, length).await })
            .await
    }

    pub async fn get_mind_map(
        &self,
        document: &TranscriptDocument,
        runtime: Option<&str>,
    ) -> Result<MindMapNode> {
        let key = self.cache_key(document, "mindmap", runtime);
        let provider = self.provider_for(runtime);
        let input = AnalyzeInput::from_document(document);
        self.cached(key, || async move { provider.mind_map(&input).await })
            .await
    }

    pub async fn get_keywords(
        &self,
        document: &TranscriptDocument,
        runtime: Option<&str>,
    ) -> Result<KeywordResponse> {
        let key = self.cache_key(document, "keywords", runtime);
        let provider = self.provider_for(runtime);
        let input = AnalyzeInput::from_document(document);
        self.cached(key, || async move { provider.keywords(&input).await })
            .await
    }

    pub async fn get_qa(
        &self,
        document: &TranscriptDocument,
        question: &str,
        runtime: Option<&str>,
    ) -> Result<QaResult> {
        let key = self.cache_key(document, &format!("qa:{}", question), runtime);
        let provider = self.provider_for(runtime);
        let input = AnalyzeInput::from_document(document);
        self.cached(key, || async move { provider.qa(&input, question).await })
            .await
    }

    pub async fn get_sentiment(
        &self,
        document: &TranscriptDocument,
        runtime: Option<&str>,
    ) -> Result<SentimentTimeline> {
        let provider = self.provider_for(runtime);
        if !provider.capabilities().sentiment_timeline {
            bail!(
                "Provider '{}' does not support sentiment timelines",
                provider.name()
            );
        }
        let key = self.cache_key(document, "sentiment", runtime);
        let input = AnalyzeInput::from_document(document);
        self.cached(key, || async move {
            provider.sentiment_timeline(&input).await
        })
        .await
    }

    pub async fn get_heatmap(
        &self,
        document: &TranscriptDocument,
        runtime: Option<&str>,
    ) -> Result<Vec<HeatmapPoint>> {
        let provider = self.provider_for(runtime);
        if !provider.capabilities().heatmap {
            bail!(
                "Provider '{}' does not support heatmaps",
                provider.name()
            );
        }
        let key = self.cache_key(document, "heatmap", runtime);
        let input = AnalyzeInput::from_document(document);
        self.cached(key, || async move { provider.heatmap(&input).await })
            .await
    }

    pub async fn get_template(
        &self,
        document: &TranscriptDocument,
        kind: TemplateKind,
        runtime: Option<&str>,
    ) -> Result<TemplateOutput> {
        let provider = self.provider_for(runtime);
        if !provider.capabilities().templates {
            bail!(
                "Provider '{}' does not support templates",
                provider.name()
            );
        }
        let key = self.cache_key(document, &format!("template:{}", kind.as_str()), runtime);
        let input = AnalyzeInput::from_document(document);
        self.cached(key, || async move { provider.templates(&input, kind).await })
            .await
    }
}
