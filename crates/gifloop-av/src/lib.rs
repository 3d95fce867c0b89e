//! # gifloop-av
//!
//! Clip extraction and external tool handling for gifloop.
//!
//! This crate provides functionality for:
//! - Building the ffmpeg command line that cuts an animated GIF from a stream
//! - Running that command with an optional timeout
//! - Detecting the external tools the pipeline depends on
//!
//! ## Features
//!
//! - `async` - Async subprocess execution via tokio (required for [`extract_clip`])
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! # #[cfg(feature = "async")]
//! # async fn demo() -> gifloop_av::Result<()> {
//! use gifloop_av::{extract_clip, require_tool, ClipRequest, GifEncoding};
//!
//! let ffmpeg = require_tool("ffmpeg")?;
//! let req = ClipRequest::new("https://example.com/live/main.m3u8", "public/item_1_temp.gif", 20);
//! extract_clip(&ffmpeg, &req, &GifEncoding::default(), None).await?;
//! # Ok(())
//! # }
//! ```

pub mod clip;
mod error;
pub mod tools;

// Re-exports
pub use clip::{build_args, ClipRequest, GifEncoding};
pub use error::{Error, Result};
pub use tools::{check_tools, get_tool_path, require_tool, ToolInfo};

#[cfg(feature = "async")]
pub use clip::extract_clip;
