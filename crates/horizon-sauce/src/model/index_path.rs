//! Two-level positions inside a sectioned list.
//!
//! An `IndexPath` addresses one item: the section it lives in and its row
//! within that section. Whether the section is global (root coordinate
//! space) or local (one child's coordinate space) depends on who holds it;
//! composites translate between the two.

use std::fmt;

/// The position of an item in a sectioned list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IndexPath {
    /// The section containing the item.
    pub section: usize,
    /// The item's index within its section.
    pub item: usize,
}

impl IndexPath {
    /// Creates an index path for `item` in `section`.
    #[inline]
    pub const fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }

    /// Returns the same item in a different section.
    #[inline]
    pub const fn with_section(self, section: usize) -> Self {
        Self {
            section,
            item: self.item,
        }
    }
}

impl From<(usize, usize)> for IndexPath {
    fn from((section, item): (usize, usize)) -> Self {
        Self::new(section, item)
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}
