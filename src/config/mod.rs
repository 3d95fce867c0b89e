mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./gifloop.toml",
        "./config.toml",
        "~/.config/gifloop/config.toml",
        "/etc/gifloop/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Checks that must hold before the batch loop can start.
///
/// Kept separate from file loading so a config with no sources can still be
/// parsed and inspected by `validate`.
pub fn validate_for_run(config: &Config) -> Result<()> {
    validate_config(config)?;

    if config.batch.sources.is_empty() {
        anyhow::bail!("No sources configured; add URLs to [batch] sources");
    }

    Ok(())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.batch.duration_secs == 0 {
        anyhow::bail!("Clip duration must be greater than 0");
    }

    for (i, source) in config.batch.sources.iter().enumerate() {
        if source.trim().is_empty() {
            anyhow::bail!("Source {} is empty", i + 1);
        }
    }

    let prefix = &config.output.prefix;
    if prefix.is_empty() || prefix.contains(['/', '\\']) {
        anyhow::bail!("Invalid output prefix: {:?}", prefix);
    }

    if config.encoding.fps == 0 {
        anyhow::bail!("Encoding fps must be greater than 0");
    }
    if config.encoding.width == 0 {
        anyhow::bail!("Encoding width must be greater than 0");
    }

    if let Some(ref path) = config.tools.ffmpeg_path {
        if !path.exists() {
            tracing::warn!("Configured ffmpeg path does not exist: {:?}", path);
        }
    }

    Ok(())
}
