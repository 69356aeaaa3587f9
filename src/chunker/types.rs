use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ChunkingConfig;

/// Dense chunk identifier, in emission order
pub type ChunkId = usize;

/// A contiguous window of events ready for embedding/indexing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: ChunkId,
    pub ts_start: f64,
    pub ts_end: f64,
    /// Event texts joined with single spaces
    pub text: String,
    /// Inclusive `[first, last]` positions in the normalized event list
    pub event_range: [usize; 2],
    /// Number of contributing events per event type
    pub event_counts: BTreeMap<String, usize>,
    /// Sum of the per-event token counts
    pub token_count: usize,
}

/// The `config` block recorded alongside the chunks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerManifest {
    pub chunk_tokens: usize,
    pub overlap_tokens: usize,
    pub max_tokens: usize,
    pub tokenizer: String,
}

/// Contents of `chunks.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunksDocument {
    pub video_id: String,
    pub config: ChunkerManifest,
    pub chunks: Vec<Chunk>,
}

impl ChunkerManifest {
    pub fn new(config: &ChunkingConfig, tokenizer: impl Into<String>) -> Self {
        Self {
            chunk_tokens: config.chunk_tokens,
            overlap_tokens: config.overlap_tokens,
            max_tokens: config.max_tokens,
            tokenizer: tokenizer.into(),
        }
    }
}
