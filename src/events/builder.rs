use std::path::Path;
use tracing::debug;

use super::ingest::SegmentsDocument;
use super::normalize::{assign_event_ids, normalize};
use super::types::{EventsDocument, RawEvent, Segment};
use crate::error::PipelineError;
use crate::paths::resolve_video_id;

/// Options for building events from ASR segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventBuilderConfig {
    /// Attach `event_id` (position after sorting) to every event
    pub include_event_id: bool,
}

impl Default for EventBuilderConfig {
    fn default() -> Self {
        Self {
            include_event_id: true,
        }
    }
}

/// Build the canonical events document from raw ASR segments
pub fn build_events(
    video_id: &str,
    segments: Vec<Segment>,
    config: &EventBuilderConfig,
) -> EventsDocument {
    let segment_count = segments.len();
    let mut events = normalize(segments.into_iter().map(RawEvent::from));

    if config.include_event_id {
        assign_event_ids(&mut events);
    }

    debug!(
        video_id,
        segments = segment_count,
        events = events.len(),
        dropped = segment_count - events.len(),
        "built events from segments"
    );

    EventsDocument {
        video_id: video_id.to_string(),
        events,
    }
}

/// Load a transcript segments file and build its events document.
///
/// The video id is `video_id` when given, else the document's own id, else
/// the name of the directory holding the file.
pub fn build_events_from_file(
    video_id: Option<&str>,
    transcript_path: &Path,
    config: &EventBuilderConfig,
) -> Result<EventsDocument, PipelineError> {
    let document = SegmentsDocument::load(transcript_path)?;
    let video_id = resolve_video_id(video_id, document.video_id.as_deref(), transcript_path)?;
    Ok(build_events(&video_id, document.segments, config))
}
