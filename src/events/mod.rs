mod builder;
mod ingest;
mod normalize;
mod types;


pub use builder::{EventBuilderConfig, build_events, build_events_from_file};
pub use ingest::{EventsInput, SegmentsDocument};
pub use normalize::{assign_event_ids, clean_text, normalize, round_ms};
pub use types::{ASR, Event, EventsDocument, RawEvent, Segment};
