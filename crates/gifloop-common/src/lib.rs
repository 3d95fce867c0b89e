//! gifloop-common: Shared artifact types and naming rules.
//!
//! - **Slots**: 1-based positions of configured sources
//! - **Path Utilities**: deterministic temp/final artifact names
//! - **Artifacts**: the per-source output model
//!
//! # Examples
//!
//! ```
//! use gifloop_common::{Artifact, Slot};
//! use std::path::Path;
//!
//! let plan = Artifact::plan(Path::new("public"), "item", &["https://a/main.m3u8"]);
//! assert_eq!(plan[0].slot, Slot::from_index(0));
//! assert_eq!(plan[0].paths.final_path, Path::new("public/item_1.gif"));
//! ```

pub mod ids;
pub mod paths;
pub mod types;

pub use ids::*;
pub use paths::ArtifactPaths;
pub use types::*;
