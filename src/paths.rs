use std::path::{Component, Path, PathBuf};

use crate::config::Settings;
use crate::error::PipelineError;

/// Check that a video id can safely name a directory.
///
/// A video id must be exactly one normal path component: no separators,
/// no `.` or `..`, nothing absolute. Ids come from file stems and from
/// document contents, so they are not trusted.
pub fn validate_video_id(video_id: &str) -> Result<(), PipelineError> {
    if video_id.trim().is_empty() {
        return Err(PipelineError::validation("Empty video id"));
    }

    if video_id.contains(['/', '\\']) {
        return Err(PipelineError::validation(format!(
            "Video id must not contain path separators: {}",
            video_id
        )));
    }

    let mut components = Path::new(video_id).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        (Some(Component::ParentDir), _) => Err(PipelineError::validation(format!(
            "Parent directory traversal not allowed: {}",
            video_id
        ))),
        (Some(Component::Prefix(_) | Component::RootDir), _) => Err(PipelineError::validation(
            format!("Absolute path not allowed: {}", video_id),
        )),
        _ => Err(PipelineError::validation(format!(
            "Video id must be a single path component: {}",
            video_id
        ))),
    }
}

/// Pick the video id for a document read from `artifact_path`.
///
/// Priority: the caller's id, then the id stored in the document, then the
/// name of the directory holding the artifact (`derived/<video_id>/...`).
/// Blank candidates are skipped. The winner is validated.
pub fn resolve_video_id(
    explicit: Option<&str>,
    from_document: Option<&str>,
    artifact_path: &Path,
) -> Result<String, PipelineError> {
    let non_blank = |s: &&str| !s.trim().is_empty();

    let video_id = explicit
        .filter(non_blank)
        .or_else(|| from_document.filter(non_blank))
        .map(|s| s.trim().to_string())
        .or_else(|| {
            artifact_path
                .parent()
                .and_then(Path::file_name)
                .and_then(|name| name.to_str())
                .map(str::to_string)
        })
        .ok_or_else(|| {
            PipelineError::validation(format!(
                "Cannot determine a video id for {}",
                artifact_path.display()
            ))
        })?;

    validate_video_id(&video_id)?;
    Ok(video_id)
}

/// Per-video file layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPaths {
    video_id: String,
    raw_root: PathBuf,
    derived_root: PathBuf,
}

impl VideoPaths {
    pub fn new(video_id: &str, settings: &Settings) -> Result<Self, PipelineError> {
        validate_video_id(video_id)?;
        Ok(Self {
            video_id: video_id.to_string(),
            raw_root: settings.raw_root.clone(),
            derived_root: settings.derived_root.clone(),
        })
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.raw_root.join(&self.video_id)
    }

    pub fn derived_dir(&self) -> PathBuf {
        self.derived_root.join(&self.video_id)
    }

    /// Where the registered copy of the video lives, e.g. `raw/<id>/video.mp4`
    pub fn raw_video_path(&self, extension: &str) -> PathBuf {
        if extension.is_empty() {
            self.raw_dir().join("video")
        } else {
            self.raw_dir().join(format!("video.{}", extension))
        }
    }

    pub fn transcript_segments_path(&self) -> PathBuf {
        self.derived_dir().join("transcript_segments.json")
    }

    pub fn events_path(&self) -> PathBuf {
        self.derived_dir().join("events.json")
    }

    pub fn chunks_path(&self) -> PathBuf {
        self.derived_dir().join("chunks.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_video_ids() {
        assert!(validate_video_id("lecture-01").is_ok());
        assert!(validate_video_id("My Talk (2024)").is_ok());
        assert!(validate_video_id(".hidden").is_ok());
    }

    #[test]
    fn test_reject_empty_id() {
        let err = validate_video_id("  ").unwrap_err();
        assert!(err.to_string().contains("Empty video id"));
    }

    #[test]
    fn test_reject_traversal() {
        let err = validate_video_id("..").unwrap_err();
        assert!(err.to_string().contains("Parent directory traversal"));
    }

    #[test]
    fn test_reject_separators() {
        assert!(validate_video_id("a/b").is_err());
        assert!(validate_video_id("a/").is_err());
        assert!(validate_video_id("/etc").is_err());
        assert!(validate_video_id("a\\b").is_err());
    }

    #[test]
    fn test_reject_current_dir() {
        let err = validate_video_id(".").unwrap_err();
        assert!(err.to_string().contains("single path component"));
    }

    #[test]
    fn test_resolve_prefers_explicit() {
        let path = Path::new("data/derived/from_dir/events.json");
        let id = resolve_video_id(Some("explicit"), Some("from_doc"), path).unwrap();
        assert_eq!(id, "explicit");
    }

    #[test]
    fn test_resolve_falls_back_to_document() {
        let path = Path::new("data/derived/from_dir/events.json");
        assert_eq!(resolve_video_id(None, Some("from_doc"), path).unwrap(), "from_doc");
        assert_eq!(resolve_video_id(Some(""), Some("from_doc"), path).unwrap(), "from_doc");
    }

    #[test]
    fn test_resolve_falls_back_to_directory() {
        let path = Path::new("data/derived/from_dir/events.json");
        assert_eq!(resolve_video_id(None, Some("  "), path).unwrap(), "from_dir");
    }

    #[test]
    fn test_resolve_fails_without_candidates() {
        assert!(resolve_video_id(None, None, Path::new("events.json")).is_err());
    }

    #[test]
    fn test_resolve_validates_document_id() {
        let path = Path::new("data/derived/ok/events.json");
        assert!(resolve_video_id(None, Some("../escape"), path).is_err());
    }

    #[test]
    fn test_video_paths_layout() {
        let settings = Settings::from_data_dir("data");
        let paths = VideoPaths::new("talk", &settings).unwrap();

        assert_eq!(paths.video_id(), "talk");
        assert_eq!(paths.raw_video_path("mkv"), Path::new("data/raw/talk/video.mkv"));
        assert_eq!(paths.raw_video_path(""), Path::new("data/raw/talk/video"));
        assert_eq!(
            paths.transcript_segments_path(),
            Path::new("data/derived/talk/transcript_segments.json")
        );
        assert_eq!(paths.events_path(), Path::new("data/derived/talk/events.json"));
        assert_eq!(paths.chunks_path(), Path::new("data/derived/talk/chunks.json"));
    }

    #[test]
    fn test_video_paths_rejects_bad_id() {
        let settings = Settings::default();
        assert!(VideoPaths::new("../x", &settings).is_err());
    }
}
