use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub default_size: usize,
    #[serde(default = "default_mind_map_size")]
    pub mind_map_size: usize,
    #[serde(default = "default_sentiment_size")]
    pub sentiment_size: usize,
    #[serde(default = "default_qa_local_size")]
    pub qa_local_size: usize,
    #[serde(default = "default_chunk_size")]
    pub qa_remote_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            default_size: default_chunk_size(),
            mind_map_size: default_mind_map_size(),
            sentiment_size: default_sentiment_size(),
            qa_local_size: default_qa_local_size(),
            qa_remote_size: default_chunk_size(),
        }
    }
}

fn default_chunk_size() -> usize {
    crate::chunk::DEFAULT_CHUNK_SIZE
}
fn default_mind_map_size() -> usize {
    800
}
fn default_sentiment_size() -> usize {
    600
}
fn default_qa_local_size() -> usize {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_qa_local_limit")]
    pub qa_local_limit: usize,
    #[serde(default = "default_qa_remote_limit")]
    pub qa_remote_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            qa_local_limit: default_qa_local_limit(),
            qa_remote_limit: default_qa_remote_limit(),
        }
    }
}

fn default_qa_local_limit() -> usize {
    crate::relevance::DEFAULT_QA_LOCAL_LIMIT
}
fn default_qa_remote_limit() -> usize {
    crate::relevance::DEFAULT_QA_REMOTE_LIMIT
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Runtime name resolved by the registry: `openai`, `gemini`, or
    /// anything else for the local heuristics.
    #[serde(default = "default_runtime")]
    pub runtime: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            model: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_runtime() -> String {
    "local".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_analysis_ttl")]
    pub analysis_ttl_secs: u64,
    #[serde(default = "default_transcript_ttl")]
    pub transcript_ttl_secs: u64,
    #[serde(default = "default_export_ttl")]
    pub export_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            analysis_ttl_secs: default_analysis_ttl(),
            transcript_ttl_secs: default_transcript_ttl(),
            export_ttl_secs: default_export_ttl(),
        }
    }
}

fn default_analysis_ttl() -> u64 {
    600
}
fn default_transcript_ttl() -> u64 {
    3600
}
fn default_export_ttl() -> u64 {
    600
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate chunking
    for (name, size) in [
        ("chunking.default_size", config.chunking.default_size),
        ("chunking.mind_map_size", config.chunking.mind_map_size),
        ("chunking.sentiment_size", config.chunking.sentiment_size),
        ("chunking.qa_local_size", config.chunking.qa_local_size),
        ("chunking.qa_remote_size", config.chunking.qa_remote_size),
    ] {
        if size == 0 {
            anyhow::bail!("{} must be > 0", name);
        }
    }

    // Validate retrieval
    if config.retrieval.qa_local_limit == 0 || config.retrieval.qa_remote_limit == 0 {
        anyhow::bail!("retrieval limits must be >= 1");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_caller_budgets() {
        let config = Config::default();
        assert_eq!(config.chunking.default_size, 1200);
        assert_eq!(config.chunking.mind_map_size, 800);
        assert_eq!(config.chunking.sentiment_size, 600);
        assert_eq!(config.chunking.qa_local_size, 1000);
        assert_eq!(config.chunking.qa_remote_size, 1200);
        assert_eq!(config.retrieval.qa_local_limit, 3);
        assert_eq!(config.retrieval.qa_remote_limit, 4);
        assert_eq!(config.provider.runtime, "local");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [chunking]
            default_size = 400

            [provider]
            runtime = "openai"
            model = "gpt-4o-mini"
            "#,
        )
        .unwrap();
        assert_eq!(config.chunking.default_size, 400);
        assert_eq!(config.chunking.mind_map_size, 800);
        assert_eq!(config.provider.runtime, "openai");
        assert_eq!(config.provider.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.cache.analysis_ttl_secs, 600);
    }

    #[test]
    fn test_empty_toml_is_valid() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.chunking.default_size, 1200);
    }
}
