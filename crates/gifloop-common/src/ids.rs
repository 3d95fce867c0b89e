//! Slot numbering for configured sources.
//!
//! A slot is the 1-based position of a source in the configured list. File
//! names are derived from it, so the same list always maps to the same files.

/// 1-based position of a source within the configured list.
///
/// Only constructible from a list index, so the number is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(usize);

impl Slot {
    /// Slot for a 0-based list index.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(index + 1)
    }

    /// The 1-based slot number.
    #[must_use]
    pub fn number(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
