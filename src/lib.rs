// Public API exports
pub mod artifact;
pub mod chunker;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod logging;
pub mod paths;
pub mod pipeline;
pub mod registry;
pub mod tokenizer;

// Re-export main types for convenience
pub use config::Settings;
pub use error::{PipelineError, TokenizerError};

pub use events::{
    Event, EventBuilderConfig, EventsDocument, RawEvent, Segment, build_events, normalize,
};

pub use chunker::{
    Chunk, ChunkingConfig, ChunksDocument, DEFAULT_CHUNK_TOKENS, DEFAULT_MAX_TOKENS,
    DEFAULT_OVERLAP_TOKENS, chunk_events, pack_events,
};

pub use tokenizer::{HuggingFaceTokenizer, TokenCounter, WhitespaceTokenizer, load_tokenizer};

pub use db::{ChunkIndex, IndexedChunk};
pub use paths::VideoPaths;
