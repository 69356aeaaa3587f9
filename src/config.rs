use std::path::{Path, PathBuf};

/// Data directory used when none is configured
pub const DEFAULT_DATA_DIR: &str = "data";

/// Locations of everything the pipeline reads and writes.
///
/// All paths hang off a single data directory:
/// ```text
/// <data_dir>/raw/<video_id>/video.<ext>
/// <data_dir>/derived/<video_id>/{transcript_segments,events,chunks}.json
/// <data_dir>/registry.json
/// <data_dir>/index.sqlite
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub raw_root: PathBuf,
    pub derived_root: PathBuf,
    pub registry_path: PathBuf,
    pub index_path: PathBuf,
}

impl Settings {
    pub fn from_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            raw_root: data_dir.join("raw"),
            derived_root: data_dir.join("derived"),
            registry_path: data_dir.join("registry.json"),
            index_path: data_dir.join("index.sqlite"),
            data_dir,
        }
    }

    /// Point the chunk index somewhere other than the data directory
    pub fn with_index_path(mut self, path: impl AsRef<Path>) -> Self {
        self.index_path = path.as_ref().to_path_buf();
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_data_dir(DEFAULT_DATA_DIR)
    }
}
