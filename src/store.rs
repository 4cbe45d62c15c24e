//! In-memory TTL stores for transcripts and analysis results.
//!
//! Uses `HashMap` behind `std::sync::RwLock` for thread safety. Entries
//! expire lazily: an expired entry is dropped on the read that finds it.
//! Nothing persists beyond process lifetime.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::models::TranscriptDocument;

struct Entry<T> {
    value: T,
    expires_at: Instant,
}

impl<T> Entry<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// TTL-bounded store for uploaded transcripts, keyed by `videoId:language`.
pub struct TranscriptStore {
    entries: RwLock<HashMap<String, Entry<TranscriptDocument>>>,
    ttl: Duration,
}

impl TranscriptStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn key(video_id: &str, language: &str) -> String {
        format!("{}:{}", video_id, language)
    }

    pub fn save(&self, document: &TranscriptDocument) {
        let key = Self::key(&document.video_id, &document.language);
        let mut entries = self.entries.write().unwrap();
        entries.insert(key, Entry::new(document.clone(), self.ttl));
    }

    pub fn get(&self, video_id: &str, language: &str) -> Option<TranscriptDocument> {
        let key = Self::key(video_id, language);
        {
            let entries = self.entries.read().unwrap();
            match entries.get(&key) {
                Some(entry) if !entry.expired() => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        // Entry exists but expired: drop it under the write lock.
        self.entries.write().unwrap().remove(&key);
        None
    }

    pub fn delete(&self, video_id: &str, language: &str) {
        let key = Self::key(video_id, language);
        self.entries.write().unwrap().remove(&key);
    }
}

/// Cache key for derived analysis results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub video_id: String,
    pub language: String,
    pub operation: String,
}

impl CacheKey {
    fn serialize(&self) -> String {
        format!("{}:{}:{}", self.video_id, self.language, self.operation)
    }
}

/// TTL-bounded cache for analysis results, stored as JSON values so one map
/// serves every operation type.
pub struct AnalysisCache {
    entries: RwLock<HashMap<String, Entry<serde_json::Value>>>,
    ttl: Duration,
}

impl AnalysisCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        let serialized = key.serialize();
        {
            let entries = self.entries.read().unwrap();
            match entries.get(&serialized) {
                Some(entry) if !entry.expired() => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.entries.write().unwrap().remove(&serialized);
        None
    }

    pub fn set(&self, key: &CacheKey, value: serde_json::Value) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(key.serialize(), Entry::new(value, self.ttl));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TranscriptSource;

    fn document(video_id: &str, language: &str) -> TranscriptDocument {
        TranscriptDocument {
            video_id: video_id.to_string(),
            language: language.to_string(),
            segments: Vec::new(),
            source: TranscriptSource::Uploaded,
        }
    }

    #[test]
    fn test_save_and_get_roundtrip() {
        let store = TranscriptStore::new(Duration::from_secs(60));
        store.save(&document("vid", "en"));
        let loaded = store.get("vid", "en").unwrap();
        assert_eq!(loaded.video_id, "vid");
        assert!(store.get("vid", "fr").is_none());
    }

    #[test]
    fn test_expired_transcript_dropped() {
        let store = TranscriptStore::new(Duration::from_millis(0));
        store.save(&document("vid", "en"));
        std::thread::sleep(Duration::from_millis(5));
        assert!(store.get("vid", "en").is_none());
    }

    #[test]
    fn test_delete() {
        let store = TranscriptStore::new(Duration::from_secs(60));
        store.save(&document("vid", "en"));
        store.delete("vid", "en");
        assert!(store.get("vid", "en").is_none());
    }

    #[test]
    fn test_cache_keys_distinguish_operations() {
        let cache = AnalysisCache::new(Duration::from_secs(60));
        let summary_key = CacheKey {
            video_id: "vid".to_string(),
            language: "en".to_string(),
            operation: "summary:short".to_string(),
        };
        let keywords_key = CacheKey {
            video_id: "vid".to_string(),
            language: "en".to_string(),
            operation: "keywords".to_string(),
        };
        cache.set(&summary_key, serde_json::json!({"short": "s"}));
        assert!(cache.get(&summary_key).is_some());
        assert!(cache.get(&keywords_key).is_none());
    }

    #[test]
    fn test_expired_cache_entry_dropped() {
        let cache = AnalysisCache::new(Duration::from_millis(0));
        let key = CacheKey {
            video_id: "vid".to_string(),
            language: "en".to_string(),
            operation: "summary:short".to_string(),
        };
        cache.set(&key, serde_json::json!(1));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(&key).is_none());
    }
}
