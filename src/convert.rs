//! The conversion collaborator seam.
//!
//! The batch runner only knows the [`Converter`] trait. Production uses
//! [`FfmpegConverter`]; tests plug in fakes that write or withhold files.

use crate::config::Config;
use async_trait::async_trait;
use gifloop_av::{ClipRequest, GifEncoding};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Produces an artifact at `request.output`, or fails.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, request: &ClipRequest) -> gifloop_av::Result<()>;
}

/// Converter backed by the ffmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    ffmpeg: PathBuf,
    encoding: GifEncoding,
    timeout: Option<Duration>,
}

impl FfmpegConverter {
    pub fn new(ffmpeg: impl Into<PathBuf>, encoding: GifEncoding, timeout: Option<Duration>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            encoding,
            timeout,
        }
    }

    /// Resolve ffmpeg (configured path first, then `PATH`) and take the
    /// encoding and timeout from config. A timeout of 0 means no limit.
    pub fn from_config(config: &Config) -> gifloop_av::Result<Self> {
        let ffmpeg = gifloop_av::get_tool_path("ffmpeg", config.tools.ffmpeg_path.as_deref())?;
        let timeout = match config.batch.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Ok(Self::new(ffmpeg, config.encoding.clone(), timeout))
    }

    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl Converter for FfmpegConverter {
    async fn convert(&self, request: &ClipRequest) -> gifloop_av::Result<()> {
        gifloop_av::extract_clip(&self.ffmpeg, request, &self.encoding, self.timeout).await
    }
}
