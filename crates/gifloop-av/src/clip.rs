//! Animated GIF clip extraction using the ffmpeg CLI.
//!
//! A [`ClipRequest`] names a source (usually an HLS playlist URL), a start
//! offset, a duration and the file to write. A [`GifEncoding`] describes the
//! output filter chain. [`build_args`] turns both into an ffmpeg argument list
//! and, with the `async` feature, [`extract_clip`] runs it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Number of stderr lines kept in a [`Error::ToolFailed`] message.
const STDERR_TAIL_LINES: usize = 5;

/// Output encoding for an animated GIF clip.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GifEncoding {
    /// Output frame rate.
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Output width in pixels; height follows the aspect ratio.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Scaler algorithm passed as `flags=` to the scale filter.
    #[serde(default = "default_scale_flags")]
    pub scale_flags: String,

    /// Pixel format (`-pix_fmt`).
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,

    /// Encoder compression level (`-compression_level`).
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    /// Pass `-movflags faststart`.
    #[serde(default = "default_faststart")]
    pub faststart: bool,
}

fn default_fps() -> u32 {
    10
}
fn default_width() -> u32 {
    320
}
fn default_scale_flags() -> String {
    "lanczos".to_string()
}
fn default_pixel_format() -> String {
    "rgb24".to_string()
}
fn default_compression_level() -> u32 {
    100
}
fn default_faststart() -> bool {
    true
}

impl Default for GifEncoding {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            width: default_width(),
            scale_flags: default_scale_flags(),
            pixel_format: default_pixel_format(),
            compression_level: default_compression_level(),
            faststart: default_faststart(),
        }
    }
}

impl GifEncoding {
    /// The `-vf` filter chain, e.g. `fps=10,scale=320:-1:flags=lanczos`.
    pub fn filter_chain(&self) -> String {
        format!(
            "fps={},scale={}:-1:flags={}",
            self.fps, self.width, self.scale_flags
        )
    }
}

/// A single clip to cut from a source.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRequest {
    /// Source URL or path handed to `-i`.
    pub source: String,
    /// Start offset in seconds.
    pub start_secs: f64,
    /// Clip length in seconds.
    pub duration_secs: u32,
    /// File ffmpeg writes to.
    pub output: PathBuf,
}

impl ClipRequest {
    /// Clip starting at the beginning of the source.
    pub fn new(source: impl Into<String>, output: impl Into<PathBuf>, duration_secs: u32) -> Self {
        Self {
            source: source.into(),
            start_secs: 0.0,
            duration_secs,
            output: output.into(),
        }
    }

    /// Set the start offset.
    pub fn with_start(mut self, start_secs: f64) -> Self {
        self.start_secs = start_secs;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.source.trim().is_empty() {
            return Err(Error::InvalidInput("clip source is empty".to_string()));
        }
        if self.duration_secs == 0 {
            return Err(Error::InvalidInput(
                "clip duration must be greater than zero".to_string(),
            ));
        }
        if self.start_secs < 0.0 || !self.start_secs.is_finite() {
            return Err(Error::InvalidInput(format!(
                "invalid start offset: {}",
                self.start_secs
            )));
        }
        Ok(())
    }
}

/// Build the ffmpeg argument list for a clip.
///
/// ```
/// use gifloop_av::clip::{build_args, ClipRequest, GifEncoding};
///
/// let req = ClipRequest::new("https://example.com/main.m3u8", "/tmp/item_1_temp.gif", 20);
/// let args = build_args(&req, &GifEncoding::default());
/// assert_eq!(args.last().map(String::as_str), Some("/tmp/item_1_temp.gif"));
/// assert!(args.contains(&"fps=10,scale=320:-1:flags=lanczos".to_string()));
/// ```
pub fn build_args(req: &ClipRequest, encoding: &GifEncoding) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-v".to_string(),
        "error".to_string(),
        "-ss".to_string(),
        format_secs(req.start_secs),
        "-i".to_string(),
        req.source.clone(),
        "-t".to_string(),
        req.duration_secs.to_string(),
        "-vf".to_string(),
        encoding.filter_chain(),
        "-pix_fmt".to_string(),
        encoding.pixel_format.clone(),
        "-compression_level".to_string(),
        encoding.compression_level.to_string(),
    ];

    if encoding.faststart {
        args.extend(["-movflags".to_string(), "faststart".to_string()]);
    }

    args.push(req.output.to_string_lossy().to_string());
    args
}

fn format_secs(secs: f64) -> String {
    if secs.fract() == 0.0 {
        format!("{}", secs as u64)
    } else {
        format!("{:.3}", secs)
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

fn tool_name(ffmpeg: &Path) -> String {
    ffmpeg
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "ffmpeg".to_string())
}

/// Run ffmpeg for a clip, optionally bounded by a timeout.
///
/// The child is killed if the timeout elapses or the returned future is
/// dropped. On success the output file is guaranteed to exist.
#[cfg(feature = "async")]
pub async fn extract_clip(
    ffmpeg: &Path,
    req: &ClipRequest,
    encoding: &GifEncoding,
    timeout: Option<std::time::Duration>,
) -> Result<()> {
    use std::process::Stdio;
    use tokio::process::Command;

    req.validate()?;

    let tool = tool_name(ffmpeg);
    let args = build_args(req, encoding);

    #[cfg(feature = "tracing")]
    tracing::debug!("Running {} {:?}", ffmpeg.display(), args);

    let child = Command::new(ffmpeg)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::tool_not_found(tool.clone()),
            _ => Error::Io(e),
        })?;

    let output = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("{} timed out after {}s, killing process", tool, limit.as_secs());
                return Err(Error::timeout(tool, limit.as_secs()));
            }
        },
        None => child.wait_with_output().await?,
    };

    if !output.status.success() {
        let tail = stderr_tail(&output.stderr);
        let message = if tail.is_empty() {
            format!("exited with {}", output.status)
        } else {
            format!("exited with {}: {}", output.status, tail)
        };
        return Err(Error::tool_failed(tool, message));
    }

    if !req.output.exists() {
        return Err(Error::MissingOutput {
            path: req.output.clone(),
        });
    }

    Ok(())
}
