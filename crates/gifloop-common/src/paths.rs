//! Deterministic artifact file naming.
//!
//! Final artifacts are named `{prefix}_{slot}.gif` and in-progress ones
//! `{prefix}_{slot}_temp.gif`. A temp name never matches a final name, so a
//! crash mid-conversion cannot leave something that looks published.

use crate::Slot;
use std::path::{Path, PathBuf};

/// Default file name prefix.
pub const DEFAULT_PREFIX: &str = "item";

/// Extension of every artifact.
pub const ARTIFACT_EXTENSION: &str = "gif";

const TEMP_SUFFIX: &str = "_temp";

/// Final file name for a slot, e.g. `item_1.gif`.
///
/// # Examples
///
/// ```
/// use gifloop_common::{paths::final_name, Slot};
///
/// assert_eq!(final_name("item", Slot::from_index(0)), "item_1.gif");
/// ```
#[must_use]
pub fn final_name(prefix: &str, slot: Slot) -> String {
    format!("{}_{}.{}", prefix, slot.number(), ARTIFACT_EXTENSION)
}

/// Temp file name for a slot, e.g. `item_1_temp.gif`.
#[must_use]
pub fn temp_name(prefix: &str, slot: Slot) -> String {
    format!("{}_{}{}.{}", prefix, slot.number(), TEMP_SUFFIX, ARTIFACT_EXTENSION)
}

/// Check if a path names an in-progress artifact.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use gifloop_common::paths::is_temp_artifact;
///
/// assert!(is_temp_artifact(Path::new("public/item_2_temp.gif")));
/// assert!(!is_temp_artifact(Path::new("public/item_2.gif")));
/// ```
pub fn is_temp_artifact(path: &Path) -> bool {
    let is_gif = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(ARTIFACT_EXTENSION))
        .unwrap_or(false);

    is_gif
        && path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(|stem| stem.ends_with(TEMP_SUFFIX))
            .unwrap_or(false)
}

/// Temp and final locations for one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Where the converter writes.
    pub temporary: PathBuf,
    /// Where the published artifact lives.
    pub final_path: PathBuf,
}

impl ArtifactPaths {
    /// Paths for `slot` inside `dir`.
    pub fn for_slot(dir: &Path, prefix: &str, slot: Slot) -> Self {
        Self {
            temporary: dir.join(temp_name(prefix, slot)),
            final_path: dir.join(final_name(prefix, slot)),
        }
    }
}
