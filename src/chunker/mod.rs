mod splitter;
mod types;


pub use splitter::{chunk_events, chunk_events_from_file, pack_events};
pub use types::{Chunk, ChunkId, ChunkerManifest, ChunksDocument};

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// Target tokens per chunk
pub const DEFAULT_CHUNK_TOKENS: usize = 512;

/// Minimum tokens shared with the following chunk
pub const DEFAULT_OVERLAP_TOKENS: usize = 100;

/// Hard cap a chunk may reach when overshooting the target
pub const DEFAULT_MAX_TOKENS: usize = 640;

/// Token budget for packing events into chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_tokens: usize,
    pub overlap_tokens: usize,
    pub max_tokens: usize,
}

impl ChunkingConfig {
    pub fn new(chunk_tokens: usize, overlap_tokens: usize, max_tokens: usize) -> Self {
        Self {
            chunk_tokens,
            overlap_tokens,
            max_tokens,
        }
    }

    /// Reject budgets the packer cannot honour.
    ///
    /// An overlap at or above the target is allowed: it still terminates, it
    /// just advances one event per chunk.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.chunk_tokens == 0 {
            return Err(PipelineError::validation("chunk_tokens must be at least 1"));
        }
        if self.chunk_tokens > self.max_tokens {
            return Err(PipelineError::validation(format!(
                "chunk_tokens ({}) must not exceed max_tokens ({})",
                self.chunk_tokens, self.max_tokens
            )));
        }
        Ok(())
    }

    /// Whether the overlap is large enough to make most chunks near-duplicates
    pub fn overlap_saturates(&self) -> bool {
        self.overlap_tokens >= self.chunk_tokens
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_CHUNK_TOKENS,
            DEFAULT_OVERLAP_TOKENS,
            DEFAULT_MAX_TOKENS,
        )
    }
}
