use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Read a JSON artifact, reporting a missing file as [`PipelineError::MissingArtifact`]
pub fn read_json(path: &Path) -> Result<Value, PipelineError> {
    read_json_as(path)
}

/// Read and deserialize a JSON artifact
pub fn read_json_as<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    if !path.is_file() {
        return Err(PipelineError::MissingArtifact(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_str(&contents).map_err(|source| PipelineError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `value` as pretty JSON, replacing `path` in one step.
///
/// The document is serialized in full before anything touches the disk, then
/// written to a sibling temp file and renamed over the target. Readers see
/// either the previous file or the new one, never a partial write.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| PipelineError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }

    let tmp_path = temp_path_for(path);
    if let Err(e) = fs::write(&tmp_path, json.as_bytes()) {
        let _ = fs::remove_file(&tmp_path);
        return Err(PipelineError::io(&tmp_path, e));
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        PipelineError::io(path, e)
    })
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
