use gifloop_av::GifEncoding;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub encoding: GifEncoding,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Where artifacts are written and served from.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Conversion output and HTTP document root
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// File name prefix, artifacts are named `{prefix}_{slot}.gif`
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./public")
}

fn default_prefix() -> String {
    gifloop_common::paths::DEFAULT_PREFIX.to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            prefix: default_prefix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Source playlist URLs, processed in order
    #[serde(default)]
    pub sources: Vec<String>,

    /// Clip length in seconds (default: 20)
    #[serde(default = "default_duration")]
    pub duration_secs: u32,

    /// Kill a conversion that runs longer than this (0 = no limit, default: 120)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Pause between passes (default: 1)
    #[serde(default = "default_cycle_delay")]
    pub cycle_delay_secs: u64,
}

fn default_duration() -> u32 {
    20
}

fn default_timeout() -> u64 {
    120
}

fn default_cycle_delay() -> u64 {
    1
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            duration_secs: default_duration(),
            timeout_secs: default_timeout(),
            cycle_delay_secs: default_cycle_delay(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}
