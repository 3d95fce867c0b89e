//! Artifact model.

use crate::paths::ArtifactPaths;
use crate::Slot;
use std::path::Path;

/// The converted output for one configured source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub slot: Slot,
    pub source: String,
    pub paths: ArtifactPaths,
}

impl Artifact {
    /// Artifact for the source at `slot`, stored in `dir`.
    pub fn new(dir: &Path, prefix: &str, slot: Slot, source: impl Into<String>) -> Self {
        Self {
            slot,
            source: source.into(),
            paths: ArtifactPaths::for_slot(dir, prefix, slot),
        }
    }

    /// One artifact per source, in list order.
    pub fn plan<S: AsRef<str>>(dir: &Path, prefix: &str, sources: &[S]) -> Vec<Self> {
        sources
            .iter()
            .enumerate()
            .map(|(i, source)| Self::new(dir, prefix, Slot::from_index(i), source.as_ref()))
            .collect()
    }
}
