//! Publishing finished artifacts into the served directory.
//!
//! A publish removes the current final file and renames the finished temp
//! file onto its name. Readers of the final path therefore see the previous
//! complete file, nothing, or the new complete file, never partial bytes.
//! The rename must stay on one filesystem; cross-device publishes are
//! rejected instead of degrading to a copy.

use gifloop_common::paths::is_temp_artifact;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Raw `EXDEV` errno (cross-device link) on Linux and macOS.
const EXDEV: i32 = 18;

/// Why a publish did not update the final artifact.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The converter reported success but there is nothing to publish.
    #[error("temporary artifact missing: {}", path.display())]
    MissingTemporary { path: PathBuf },

    /// The previous final artifact could not be removed.
    #[error("failed to remove {}: {source}", path.display())]
    RemoveFinal {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The rename itself failed.
    #[error("failed to rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Temp and final paths live on different filesystems.
    #[error("{} and {} are on different filesystems", from.display(), to.display())]
    CrossDevice { from: PathBuf, to: PathBuf },
}

/// Replace `final_path` with `temporary`.
///
/// Never panics; every failure is logged and returned. On error the caller
/// must not assume the final file was updated.
pub fn publish(temporary: &Path, final_path: &Path) -> Result<(), PublishError> {
    let result = try_publish(temporary, final_path);
    if let Err(ref e) = result {
        error!("Publish failed: {}", e);
    }
    result
}

fn try_publish(temporary: &Path, final_path: &Path) -> Result<(), PublishError> {
    if !temporary.is_file() {
        return Err(PublishError::MissingTemporary {
            path: temporary.to_path_buf(),
        });
    }

    if !same_filesystem(temporary, final_path) {
        return Err(PublishError::CrossDevice {
            from: temporary.to_path_buf(),
            to: final_path.to_path_buf(),
        });
    }

    if final_path.exists() {
        match std::fs::remove_file(final_path) {
            Ok(()) => {}
            // Already gone, nothing to clear
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(PublishError::RemoveFinal {
                    path: final_path.to_path_buf(),
                    source,
                })
            }
        }
    }

    std::fs::rename(temporary, final_path)
        .map_err(|source| rename_error(temporary, final_path, source))
}

/// Classify a failed rename. Cross-device failures are never retried as a copy.
fn rename_error(from: &Path, to: &Path, source: io::Error) -> PublishError {
    if source.raw_os_error() == Some(EXDEV) {
        PublishError::CrossDevice {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        }
    } else {
        PublishError::Rename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }
    }
}

/// Remove a temp artifact if present. Returns whether a file was removed.
pub fn discard(temporary: &Path) -> bool {
    match std::fs::remove_file(temporary) {
        Ok(()) => {
            info!("Deleted temp file: {:?}", temporary);
            true
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            warn!("Failed to delete temp file {:?}: {}", temporary, e);
            false
        }
    }
}

/// Create the output directory if needed.
pub fn ensure_output_dir(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    if !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("{:?} is not a directory", dir),
        ));
    }
    Ok(())
}

/// Remove every temp artifact in `dir`, including ones from slots that no
/// longer exist in the configuration. Returns how many were removed.
pub fn sweep_temp_artifacts(dir: &Path) -> usize {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to read {:?}: {}", dir, e);
            return 0;
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_temp_artifact(path))
        .filter(|path| discard(path))
        .count()
}

#[cfg(unix)]
fn same_filesystem(temporary: &Path, final_path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    let parent = match final_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    match (std::fs::metadata(temporary), std::fs::metadata(parent)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev(),
        // Let the rename report the real error
        _ => true,
    }
}

#[cfg(not(unix))]
fn same_filesystem(_temporary: &Path, _final_path: &Path) -> bool {
    true
}
