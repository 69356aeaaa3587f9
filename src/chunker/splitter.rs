use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use super::ChunkingConfig;
use super::types::{Chunk, ChunkerManifest, ChunksDocument};
use crate::error::PipelineError;
use crate::events::{Event, EventsInput, RawEvent, normalize, round_ms};
use crate::paths::resolve_video_id;
use crate::tokenizer::TokenCounter;

/// Chunk a list of events.
///
/// The events are normalized first (empty texts dropped, times resolved,
/// stable-sorted), so the caller does not need to pass them in order.
/// `event_range` in the returned chunks indexes that normalized list, not the
/// caller's list.
///
/// Each event text is tokenized exactly once; the counts drive both packing
/// and overlap.
pub fn chunk_events(
    events: Vec<RawEvent>,
    counter: &dyn TokenCounter,
    config: &ChunkingConfig,
) -> Result<Vec<Chunk>, PipelineError> {
    config.validate()?;
    if config.overlap_saturates() {
        warn!(
            chunk_tokens = config.chunk_tokens,
            overlap_tokens = config.overlap_tokens,
            "overlap is not below the chunk target; expect one chunk per event"
        );
    }

    let events = normalize(events);
    let token_counts = events
        .iter()
        .map(|e| counter.count(&e.text))
        .collect::<Result<Vec<_>, _>>()?;

    let chunks = pack_events(&events, &token_counts, config);
    debug!(
        events = events.len(),
        chunks = chunks.len(),
        tokenizer = counter.identifier(),
        "packed events into chunks"
    );
    Ok(chunks)
}

/// Load an events file and chunk it into a full chunks document.
///
/// The video id is `video_id` when given, else the document's own id, else
/// the name of the directory holding the file.
pub fn chunk_events_from_file(
    video_id: Option<&str>,
    events_path: &Path,
    counter: &dyn TokenCounter,
    config: &ChunkingConfig,
) -> Result<ChunksDocument, PipelineError> {
    let input = EventsInput::load(events_path)?;
    let video_id = resolve_video_id(video_id, input.video_id.as_deref(), events_path)?;
    let chunks = chunk_events(input.events, counter, config)?;

    Ok(ChunksDocument {
        video_id,
        config: ChunkerManifest::new(config, counter.identifier()),
        chunks,
    })
}

/// Greedily pack already-normalized events using precomputed token counts.
///
/// Rules:
/// - a chunk always takes its first event, however large (events are never split)
/// - following events are taken while the total stays within `chunk_tokens`
/// - the first event that would overshoot is still taken if that lands closer
///   to the target than stopping would, and stays within `max_tokens`
/// - the next chunk restarts far enough back to share at least
///   `overlap_tokens` worth of whole events, but always at least one event
///   after the previous start
/// - packing stops once a chunk reaches the last event
pub fn pack_events(events: &[Event], token_counts: &[usize], config: &ChunkingConfig) -> Vec<Chunk> {
    debug_assert_eq!(events.len(), token_counts.len());

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < events.len() {
        let (end, token_count) = grow_chunk(token_counts, start, config);
        chunks.push(create_chunk(chunks.len(), &events[start..=end], start, token_count));

        if end + 1 >= events.len() {
            break;
        }
        start = next_start(token_counts, start, end, config.overlap_tokens);
    }

    chunks
}

/// Extend a chunk from `start`; returns the inclusive end index and token total
fn grow_chunk(token_counts: &[usize], start: usize, config: &ChunkingConfig) -> (usize, usize) {
    let mut end = start;
    let mut running = token_counts[start];

    for (idx, &tokens) in token_counts.iter().enumerate().skip(start + 1) {
        let with_candidate = running + tokens;

        if with_candidate <= config.chunk_tokens {
            running = with_candidate;
            end = idx;
            continue;
        }

        // Overshooting: take the candidate only if it lands closer to the target
        let diff_stop = config.chunk_tokens.abs_diff(running);
        let diff_add = config.chunk_tokens.abs_diff(with_candidate);
        if diff_add <= diff_stop && with_candidate <= config.max_tokens {
            running = with_candidate;
            end = idx;
        }
        break;
    }

    (end, running)
}

/// Walk back from `end` until `overlap_tokens` are covered or `start` is passed
fn next_start(token_counts: &[usize], start: usize, end: usize, overlap_tokens: usize) -> usize {
    let mut lowest = end + 1;
    let mut back_tokens = 0;

    while lowest > start && back_tokens < overlap_tokens {
        lowest -= 1;
        back_tokens += token_counts[lowest];
    }

    lowest.max(start + 1)
}

fn create_chunk(chunk_id: usize, events: &[Event], first: usize, token_count: usize) -> Chunk {
    let ts_start = events
        .iter()
        .map(|e| e.t_start)
        .fold(f64::INFINITY, f64::min);
    let ts_end = events
        .iter()
        .map(|e| e.t_end)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut event_counts = BTreeMap::new();
    for event in events {
        *event_counts.entry(event.kind.clone()).or_insert(0) += 1;
    }

    let text = events
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Chunk {
        chunk_id,
        ts_start: round_ms(ts_start),
        ts_end: round_ms(ts_end),
        text,
        event_range: [first, first + events.len() - 1],
        event_counts,
        token_count,
    }
}
