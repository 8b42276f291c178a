use crate::{probe_media, MediaInfo, MediaKind, ProbeError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// File extensions offered by the open dialog
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "webm", "mkv", "ogg", "ogv"];

/// ffprobe `format_name` entries that map to containers we play back
const SUPPORTED_FORMATS: &[&str] = &["mov", "mp4", "m4a", "3gp", "matroska", "webm", "ogg"];

pub fn is_supported_container(format_name: &str) -> bool {
    format_name
        .split(',')
        .map(str::trim)
        .any(|f| SUPPORTED_FORMATS.contains(&f))
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error("{0} has no video stream")]
    NotVideo(PathBuf),
    #[error("unsupported container: {0}")]
    UnsupportedContainer(String),
}

/// A video file selected for annotation. The handle is released when dropped.
#[derive(Debug)]
pub struct MediaSource {
    info: MediaInfo,
    name: String,
}

impl MediaSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let info = probe_media(path)?;
        Self::from_info(info)
    }

    /// Validate already-probed media
    pub fn from_info(info: MediaInfo) -> Result<Self, SourceError> {
        if info.kind != MediaKind::Video || info.dimensions().is_none() {
            return Err(SourceError::NotVideo(info.path.clone()));
        }
        if let Some(format) = &info.format_name {
            if !is_supported_container(format) {
                return Err(SourceError::UnsupportedContainer(format.clone()));
            }
        }
        let name = info
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| info.path.display().to_string());
        info!(
            "opened {name}: {:?}x{:?}, {:?}s",
            info.width, info.height, info.duration_seconds
        );
        Ok(Self { info, name })
    }

    /// File name including extension
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.info.path
    }

    pub fn duration(&self) -> Option<f64> {
        self.info.duration_seconds
    }
}

impl Drop for MediaSource {
    fn drop(&mut self) {
        info!("released {}", self.name);
    }
}
