//! Per-video pipeline stages wired to the on-disk layout.
//!
//! Each stage checks its input artifact first, builds its output fully in
//! memory and only then replaces the output file.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::PathBuf;
use tracing::warn;

use crate::artifact;
use crate::chunker::{self, Chunk, ChunkingConfig};
use crate::config::Settings;
use crate::db::{ChunkIndex, IndexedChunk};
use crate::error::PipelineError;
use crate::events::{self, EventBuilderConfig};
use crate::logging::stage;
use crate::paths::VideoPaths;
use crate::tokenizer::TokenCounter;

/// A written artifact and how many records it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactWritten {
    pub path: PathBuf,
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub events: ArtifactWritten,
    pub chunks: ArtifactWritten,
    pub indexed: usize,
}

/// `transcript_segments.json` -> `events.json`
pub fn build_events(
    settings: &Settings,
    video_id: &str,
    config: &EventBuilderConfig,
) -> Result<ArtifactWritten> {
    let paths = VideoPaths::new(video_id, settings)?;

    stage("events", video_id, || -> Result<ArtifactWritten> {
        let transcript_path = paths.transcript_segments_path();
        let document = events::build_events_from_file(Some(video_id), &transcript_path, config)
            .with_context(|| format!("Failed to build events for '{}'", video_id))?;

        let out_path = paths.events_path();
        artifact::write_json_atomic(&out_path, &document)?;

        Ok(ArtifactWritten {
            path: out_path,
            records: document.events.len(),
        })
    })
}

/// `events.json` -> `chunks.json`
pub fn chunk_video(
    settings: &Settings,
    video_id: &str,
    config: &ChunkingConfig,
    counter: &dyn TokenCounter,
) -> Result<ArtifactWritten> {
    let paths = VideoPaths::new(video_id, settings)?;

    stage("chunk", video_id, || -> Result<ArtifactWritten> {
        let events_path = paths.events_path();
        let document =
            chunker::chunk_events_from_file(Some(video_id), &events_path, counter, config)
                .with_context(|| format!("Failed to chunk events for '{}'", video_id))?;

        let out_path = paths.chunks_path();
        artifact::write_json_atomic(&out_path, &document)?;

        Ok(ArtifactWritten {
            path: out_path,
            records: document.chunks.len(),
        })
    })
}

/// `chunks.json` -> chunk index rows for the video
pub fn index_video(settings: &Settings, video_id: &str) -> Result<usize> {
    let paths = VideoPaths::new(video_id, settings)?;

    stage("index", video_id, || -> Result<usize> {
        let chunks_path = paths.chunks_path();
        let rows = indexed_rows(artifact::read_json(&chunks_path)?)
            .with_context(|| format!("Invalid chunks file: {}", chunks_path.display()))?;

        if rows.is_empty() {
            warn!(video_id, "chunks file is empty; clearing the video's index rows");
        }

        let mut index = ChunkIndex::open(&settings.index_path)?;
        index.upsert_chunks(video_id, &rows)
    })
}

/// Events, chunks and index in sequence
pub fn run_all(
    settings: &Settings,
    video_id: &str,
    event_config: &EventBuilderConfig,
    chunking: &ChunkingConfig,
    counter: &dyn TokenCounter,
) -> Result<RunSummary> {
    let events = build_events(settings, video_id, event_config)?;
    let chunks = chunk_video(settings, video_id, chunking, counter)?;
    let indexed = index_video(settings, video_id)?;

    Ok(RunSummary {
        events,
        chunks,
        indexed,
    })
}

fn indexed_rows(document: Value) -> Result<Vec<IndexedChunk>, PipelineError> {
    let Value::Object(mut map) = document else {
        return Err(PipelineError::validation("chunks document must be a JSON object"));
    };

    match map.remove("chunks") {
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                serde_json::from_value::<Chunk>(item)
                    .map(|chunk| IndexedChunk::from(&chunk))
                    .map_err(|e| {
                        PipelineError::validation(format!("chunk {} is malformed: {}", idx, e))
                    })
            })
            .collect(),
        _ => Err(PipelineError::validation(
            "chunks document has no 'chunks' list",
        )),
    }
}
