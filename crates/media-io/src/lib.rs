use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

mod capture;
mod decode;
mod encoded;
mod source;
pub use capture::{encode_jpeg, FrameCapturer, FrameSource, DEFAULT_JPEG_QUALITY};
pub use decode::{best_decoder, DecodeError, RgbaFrame, VideoDecoder};
pub use encoded::EncodedImage;
pub use source::{is_supported_container, MediaSource, SourceError, SUPPORTED_EXTENSIONS};

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("ffprobe not found on PATH; please install FFmpeg (ffprobe)")]
    FfprobeMissing,
    #[error("ffprobe failed: {0}")]
    FfprobeFailed(String),
    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    format_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct FfprobeJson {
    streams: Option<Vec<FfprobeStream>>,
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Clone)]
pub struct MediaInfo {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub format_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration_seconds: Option<f64>,
}

impl MediaInfo {
    /// Pixel dimensions, when both are known and non-zero
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
    Audio,
}

pub fn probe_media(path: &Path) -> Result<MediaInfo, ProbeError> {
    let ffprobe = which::which("ffprobe").map_err(|_| ProbeError::FfprobeMissing)?;
    let out = Command::new(ffprobe)
        .arg("-v")
        .arg("error")
        .arg("-show_format")
        .arg("-show_streams")
        .arg("-print_format")
        .arg("json")
        .arg(path)
        .output()
        .map_err(|e| ProbeError::FfprobeFailed(e.to_string()))?;
    if !out.status.success() {
        return Err(ProbeError::FfprobeFailed(
            String::from_utf8_lossy(&out.stderr).into(),
        ));
    }
    parse_probe_output(path, &out.stdout)
}

/// Build [`MediaInfo`] from `ffprobe -print_format json` output.
pub fn parse_probe_output(path: &Path, json: &[u8]) -> Result<MediaInfo, ProbeError> {
    let parsed: FfprobeJson =
        serde_json::from_slice(json).map_err(|e| ProbeError::Parse(e.to_string()))?;

    let mut kind = None;
    let mut width = None;
    let mut height = None;

    if let Some(streams) = &parsed.streams {
        for s in streams {
            match s.codec_type.as_deref() {
                Some("video") => {
                    kind = Some(MediaKind::Video);
                    width = width.or(s.width);
                    height = height.or(s.height);
                }
                Some("audio") => {
                    if kind != Some(MediaKind::Video) {
                        kind = Some(MediaKind::Audio);
                    }
                }
                Some("image") => {
                    if kind != Some(MediaKind::Video) {
                        kind = Some(MediaKind::Image);
                    }
                    width = width.or(s.width);
                    height = height.or(s.height);
                }
                _ => {}
            }
        }
    }

    let kind = kind.ok_or_else(|| ProbeError::Parse("no audio or video streams".to_string()))?;

    let duration_seconds = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|d| d.parse().ok());
    let format_name = parsed.format.and_then(|f| f.format_name);

    Ok(MediaInfo {
        path: path.to_path_buf(),
        kind,
        format_name,
        width,
        height,
        duration_seconds,
    })
}
