use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Type and source tag of events derived from speech recognition
pub const ASR: &str = "asr";

/// One raw transcription segment as written by the ASR step
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Segment {
    pub start: Option<f64>,
    pub end: Option<f64>,
    #[serde(default, deserialize_with = "text_as_string")]
    pub text: Option<String>,
}

/// An event as found in an events document, before normalization.
///
/// Every field is optional so that hand-edited or partially denormalized
/// documents can still be chunked.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub source: Option<String>,
    pub t_start: Option<f64>,
    pub t_end: Option<f64>,
    /// Point-in-time stamp used when `t_start`/`t_end` are absent
    pub t: Option<f64>,
    #[serde(default, deserialize_with = "text_as_string")]
    pub text: Option<String>,
}

/// Canonical, time-ordered unit of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<usize>,
    #[serde(rename = "type")]
    pub kind: String,
    pub t_start: f64,
    pub t_end: f64,
    pub text: String,
    pub source: String,
}

/// Contents of `events.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventsDocument {
    pub video_id: String,
    pub events: Vec<Event>,
}

/// Accept any JSON value as text; scalars and containers keep their JSON spelling
fn text_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

impl RawEvent {
    /// Resolve the event's time span.
    ///
    /// `t_start` falls back to `t`, then to 0.0. `t_end` falls back to `t`,
    /// then to the resolved start.
    pub fn resolve_times(&self) -> (f64, f64) {
        let t_start = self.t_start.or(self.t).unwrap_or(0.0);
        let t_end = self.t_end.or(self.t).unwrap_or(t_start);
        (t_start, t_end)
    }
}

impl From<Segment> for RawEvent {
    fn from(segment: Segment) -> Self {
        Self {
            kind: Some(ASR.to_string()),
            source: Some(ASR.to_string()),
            t_start: segment.start,
            t_end: segment.end,
            t: None,
            text: segment.text,
        }
    }
}

impl From<Event> for RawEvent {
    fn from(event: Event) -> Self {
        Self {
            kind: Some(event.kind),
            source: Some(event.source),
            t_start: Some(event.t_start),
            t_end: Some(event.t_end),
            t: None,
            text: Some(event.text),
        }
    }
}
