use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;

use super::types::{RawEvent, Segment};
use crate::artifact;
use crate::error::PipelineError;

/// Parsed `transcript_segments.json`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentsDocument {
    /// The document's own video id, if it carries a non-empty one
    pub video_id: Option<String>,
    pub segments: Vec<Segment>,
}

/// Parsed `events.json` as the chunker consumes it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventsInput {
    pub video_id: Option<String>,
    pub events: Vec<RawEvent>,
}

impl SegmentsDocument {
    /// Read and validate a transcript segments file
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        Self::from_value(artifact::read_json(path)?)
    }

    pub fn from_value(value: Value) -> Result<Self, PipelineError> {
        let mut map = expect_object(value, "transcript")?;
        Ok(Self {
            video_id: document_video_id(map.get("video_id")),
            segments: list_field(&mut map, "segments")?,
        })
    }
}

impl EventsInput {
    /// Read and validate an events file
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        Self::from_value(artifact::read_json(path)?)
    }

    pub fn from_value(value: Value) -> Result<Self, PipelineError> {
        let mut map = expect_object(value, "events")?;
        Ok(Self {
            video_id: document_video_id(map.get("video_id")),
            events: list_field(&mut map, "events")?,
        })
    }
}

fn expect_object(value: Value, what: &str) -> Result<Map<String, Value>, PipelineError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(PipelineError::validation(format!(
            "{what} document must be a JSON object, found {}",
            json_kind(&other)
        ))),
    }
}

/// A missing field is an empty list; anything but an array is rejected.
fn list_field<T: DeserializeOwned>(
    map: &mut Map<String, Value>,
    field: &str,
) -> Result<Vec<T>, PipelineError> {
    let items = match map.remove(field) {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(PipelineError::validation(format!(
                "'{field}' must be a list, found {}",
                json_kind(&other)
            )));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value(item).map_err(|e| {
                PipelineError::validation(format!("'{field}' item {idx} is malformed: {e}"))
            })
        })
        .collect()
}

fn document_video_id(value: Option<&Value>) -> Option<String> {
    let id = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
