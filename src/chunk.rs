//! Segment-preserving transcript chunker.
//!
//! Groups ordered segments into [`Chunk`]s that respect a configurable
//! character budget while recording which segment ids contributed to each
//! chunk. Segments are never split mid-utterance: a single segment longer
//! than the budget still becomes one (oversized) chunk, because truncating
//! an utterance would lose more than it saves.
//!
//! When an incoming segment would overflow a non-empty buffer, the open
//! chunk closes with `end` taken from the previous segment — the last one
//! actually absorbed. Downstream citation display relies on that boundary,
//! so it is part of the contract.

use crate::models::{Chunk, Segment};

/// Default character budget per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1200;

/// Group ordered segments into chunks of at most `chunk_size` characters.
///
/// Segments are assumed normalized (ordered, non-empty ids). Each chunk's
/// text is the space-joined, trimmed concatenation of its segments, and its
/// `segment_ids` lists the contributors in source order. Every input segment
/// lands in exactly one chunk.
pub fn chunk_transcript(segments: &[Segment], chunk_size: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut buffer = String::new();
    // The budget is measured in characters, not bytes, so multibyte text
    // fills a chunk at the same rate as ASCII.
    let mut buffer_chars = 0usize;
    let mut start = segments.first().map(|s| s.start).unwrap_or(0.0);
    let mut segment_ids: Vec<String> = Vec::new();

    for (index, segment) in segments.iter().enumerate() {
        let segment_chars = segment.text.chars().count();
        let candidate_chars = if buffer.is_empty() {
            segment_chars
        } else {
            buffer_chars + 1 + segment_chars
        };

        if candidate_chars > chunk_size && !buffer.is_empty() {
            let end = index
                .checked_sub(1)
                .map(|prev| segments[prev].end)
                .unwrap_or(segment.end);
            chunks.push(Chunk {
                text: buffer.trim().to_string(),
                start,
                end,
                segment_ids: std::mem::take(&mut segment_ids),
            });
            buffer = segment.text.clone();
            buffer_chars = segment_chars;
            start = segment.start;
            segment_ids.push(segment.id.clone());
        } else {
            if buffer.is_empty() {
                buffer = segment.text.clone();
            } else {
                buffer.push(' ');
                buffer.push_str(&segment.text);
            }
            buffer_chars = candidate_chars;
            if segment_ids.is_empty() {
                start = segment.start;
            }
            segment_ids.push(segment.id.clone());
        }
    }

    if !buffer.trim().is_empty() {
        let end = segments.last().map(|s| s.end).unwrap_or(start);
        chunks.push(Chunk {
            text: buffer.trim().to_string(),
            start,
            end,
            segment_ids,
        });
    }

    chunks
}
