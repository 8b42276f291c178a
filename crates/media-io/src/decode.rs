use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

/// A decoded frame, tightly packed RGBA8 at the video's native size
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RgbaFrame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Single-colour frame, handy for placeholders and tests
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::new(width, height, data)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Non-empty and the buffer matches the dimensions
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.data.len() == self.pixel_count() * 4
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("ffmpeg not found on PATH; please install FFmpeg")]
    NotAvailable,
    #[error("media has no video dimensions")]
    NoVideo,
    #[error("decode failed: {0}")]
    Failed(String),
}

pub trait VideoDecoder {
    fn decode_rgba_at(&mut self, path: &Path, t_sec: f64) -> Result<RgbaFrame, DecodeError>;
}

pub fn best_decoder() -> Box<dyn VideoDecoder + Send> {
    debug!("Using FFmpeg decoder");
    Box::new(FfmpegDecoder::default())
}

/// Decodes single frames through the `ffmpeg` CLI. Dimensions are probed
/// once per file.
#[derive(Default)]
struct FfmpegDecoder {
    probed: Option<(PathBuf, u32, u32)>,
}

impl FfmpegDecoder {
    fn dimensions(&mut self, path: &Path) -> Result<(u32, u32), DecodeError> {
        if let Some((cached, w, h)) = &self.probed {
            if cached == path {
                return Ok((*w, *h));
            }
        }
        let info = crate::probe_media(path).map_err(|e| DecodeError::Failed(e.to_string()))?;
        let (w, h) = info.dimensions().ok_or(DecodeError::NoVideo)?;
        self.probed = Some((path.to_path_buf(), w, h));
        Ok((w, h))
    }
}

impl VideoDecoder for FfmpegDecoder {
    fn decode_rgba_at(&mut self, path: &Path, t_sec: f64) -> Result<RgbaFrame, DecodeError> {
        let ffmpeg = which::which("ffmpeg").map_err(|_| DecodeError::NotAvailable)?;
        let (w, h) = self.dimensions(path)?;
        let out = Command::new(ffmpeg)
            .arg("-ss")
            .arg(format!("{:.3}", t_sec.max(0.0)))
            .arg("-i")
            .arg(path)
            .arg("-frames:v")
            .arg("1")
            .arg("-vf")
            .arg(format!("scale={w}:{h}"))
            .arg("-f")
            .arg("rawvideo")
            .arg("-pix_fmt")
            .arg("rgba")
            .arg("-threads")
            .arg("1")
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| DecodeError::Failed(e.to_string()))?;
        if !out.status.success() {
            return Err(DecodeError::Failed(format!(
                "ffmpeg exited with {}",
                out.status
            )));
        }

        let expected = w as usize * h as usize * 4;
        if out.stdout.len() < expected {
            // Seeking past the last frame yields no output.
            return Err(DecodeError::Failed(format!(
                "short frame at {t_sec:.3}s: {} of {expected} bytes",
                out.stdout.len()
            )));
        }
        let mut data = out.stdout;
        data.truncate(expected);
        debug!("decoded {w}x{h} frame at {t_sec:.3}s");
        Ok(RgbaFrame::new(w, h, data))
    }
}
