//! Keyword-overlap relevance scoring for transcript chunks.
//!
//! Ranks chunks against a free-text query using weighted substring
//! occurrence counts. Substring matching (rather than word matching) is
//! deliberate: it catches partial and stemmed forms without a stemmer, and
//! the length-based weighting keeps short keywords from dominating.

use crate::models::Chunk;

/// Default number of chunks handed to the local Q&A path.
pub const DEFAULT_QA_LOCAL_LIMIT: usize = 3;
/// Default number of chunks handed to remote providers for Q&A.
pub const DEFAULT_QA_REMOTE_LIMIT: usize = 4;

/// Return the top `limit` chunks by relevance to `query`, best first.
///
/// The query is lowercased, non-alphanumeric characters become spaces, and
/// the remaining whitespace-separated tokens are the keywords (duplicates
/// kept, so a repeated query word counts twice). Each chunk scores the sum
/// over keywords of its non-overlapping occurrence count, weighted 2 for
/// keywords longer than four characters and 1 otherwise. Chunks scoring
/// zero are dropped; ties keep original chunk order.
pub fn select_relevant_chunks(chunks: &[Chunk], query: &str, limit: usize) -> Vec<Chunk> {
    let keywords = tokenize_query(query);
    if keywords.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(&Chunk, u64)> = chunks
        .iter()
        .filter_map(|chunk| {
            let score = score_chunk(&chunk.text, &keywords);
            (score > 0).then_some((chunk, score))
        })
        .collect();

    // Vec::sort_by is stable, so equal scores preserve chunk order.
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(limit);
    scored.into_iter().map(|(chunk, _)| chunk.clone()).collect()
}

/// Lowercase `query` and split into keywords on non-alphanumeric boundaries.
fn tokenize_query(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(|token| token.to_string())
        .collect()
}

fn score_chunk(text: &str, keywords: &[String]) -> u64 {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .map(|keyword| {
            let occurrences = haystack.matches(keyword.as_str()).count() as u64;
            let weight = if keyword.len() > 4 { 2 } else { 1 };
            occurrences * weight
        })
        .sum()
}
