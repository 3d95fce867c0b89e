//! External tool detection.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check the tools the clip pipeline shells out to.
pub fn check_tools() -> Vec<ToolInfo> {
    vec![probe("ffmpeg", "-version")]
}

/// Resolve `name` on `PATH` and run it with `version_arg`.
///
/// A tool that resolves but exits non-zero is reported unavailable.
fn probe(name: &str, version_arg: &str) -> ToolInfo {
    let unavailable = ToolInfo {
        name: name.to_string(),
        available: false,
        version: None,
        path: None,
    };

    let Ok(path) = which::which(name) else {
        return unavailable;
    };

    match Command::new(&path).arg(version_arg).output() {
        Ok(output) if output.status.success() => ToolInfo {
            version: String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(str::to_string),
            available: true,
            path: Some(path),
            ..unavailable
        },
        _ => unavailable,
    }
}

/// Require that a tool is available, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
    }

    require_tool(name)
}
