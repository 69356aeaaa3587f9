use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::artifact;
use crate::config::Settings;
use crate::error::PipelineError;
use crate::paths::VideoPaths;

/// Contents of `registry.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub videos: BTreeMap<String, RegistryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub title: String,
    pub added_at: DateTime<Utc>,
    pub raw_path: PathBuf,
    /// SHA-256 of the video file, hex encoded
    #[serde(default)]
    pub sha256: Option<String>,
}

/// Outcome of [`register_video`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredVideo {
    pub video_id: String,
    pub raw_video_path: PathBuf,
    pub derived_dir: PathBuf,
}

/// Load the registry; a missing file is an empty registry
pub fn load_registry(path: &Path) -> Result<Registry> {
    if !path.exists() {
        return Ok(Registry::default());
    }
    artifact::read_json_as(path)
        .with_context(|| format!("Failed to load registry: {}", path.display()))
}

pub fn save_registry(path: &Path, registry: &Registry) -> Result<()> {
    artifact::write_json_atomic(path, registry)
        .with_context(|| format!("Failed to save registry: {}", path.display()))
}

/// Registered video ids, sorted
pub fn list_video_ids(path: &Path) -> Result<Vec<String>> {
    Ok(load_registry(path)?.videos.into_keys().collect())
}

/// Compute SHA256 hash of file contents
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("Failed to hash file: {}", path.display()))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Add a video file to the pipeline.
///
/// The video id is the file stem. The file is copied to
/// `raw/<id>/video.<ext>` unless a copy already exists, the derived directory
/// is created, and the registry entry is written (replacing any previous
/// entry for the same id).
pub fn register_video(settings: &Settings, input: &Path) -> Result<RegisteredVideo> {
    if !input.is_file() {
        return Err(PipelineError::MissingArtifact(input.to_path_buf()).into());
    }

    let video_id = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            PipelineError::validation(format!("Cannot derive a video id from {}", input.display()))
        })?
        .to_string();
    let paths = VideoPaths::new(&video_id, settings)?;

    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let raw_video_path = paths.raw_video_path(&extension);

    fs::create_dir_all(paths.raw_dir())
        .with_context(|| format!("Failed to create {}", paths.raw_dir().display()))?;
    if !raw_video_path.exists() {
        fs::copy(input, &raw_video_path).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                input.display(),
                raw_video_path.display()
            )
        })?;
    }

    let derived_dir = paths.derived_dir();
    fs::create_dir_all(&derived_dir)
        .with_context(|| format!("Failed to create {}", derived_dir.display()))?;

    let sha256 = hash_file(&raw_video_path)?;

    let mut registry = load_registry(&settings.registry_path)?;
    registry.videos.insert(
        video_id.clone(),
        RegistryEntry {
            title: video_id.clone(),
            added_at: Utc::now(),
            raw_path: raw_video_path.clone(),
            sha256: Some(sha256),
        },
    );
    save_registry(&settings.registry_path, &registry)?;

    info!(video_id = %video_id, raw = %raw_video_path.display(), "registered video");

    Ok(RegisteredVideo {
        video_id,
        raw_video_path,
        derived_dir,
    })
}
