//! Positional change notifications.
//!
//! Every mutation of a data source is described by exactly one [`Action`]
//! sent to its container. Composites re-address the action into their own
//! coordinate space and pass it on, until the root host applies it to the
//! collection view.
//!
//! # Batch Ordering
//!
//! A [`Action::Batch`] is applied by the widget as one uninterrupted
//! transition. Inside a batch:
//!
//! - deletions (`DeleteItems`, `DeleteSections`) use **pre-batch** indices;
//! - insertions (`InsertItems`, `InsertSections`) use indices in the list as
//!   it looks once the whole batch has been applied, and are issued in
//!   ascending order after all deletions;
//! - moves (`MoveItem`, `MoveSection`) carry the element's pre-batch index
//!   as `from` and its final index as `to`.
//!
//! Engines in this crate always emit deletions first, then insertions, then
//! moves, and never nest batches.

use super::index_path::IndexPath;

/// A positional list mutation, at item or section granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Items were inserted at the given positions.
    InsertItems(Vec<IndexPath>),
    /// Items were deleted from the given positions.
    DeleteItems(Vec<IndexPath>),
    /// The items at the given positions changed in place.
    ReloadItems(Vec<IndexPath>),
    /// An item moved from one position to another.
    MoveItem {
        /// Pre-batch position.
        from: IndexPath,
        /// Final position.
        to: IndexPath,
    },
    /// Sections were inserted at the given indices.
    InsertSections(Vec<usize>),
    /// Sections were deleted from the given indices.
    DeleteSections(Vec<usize>),
    /// The sections at the given indices changed wholesale.
    ReloadSections(Vec<usize>),
    /// A section moved from one index to another.
    MoveSection {
        /// Pre-batch index.
        from: usize,
        /// Final index.
        to: usize,
    },
    /// Actions the widget must apply as one atomic transition.
    Batch(Vec<Action>),
}

impl Action {
    /// Wraps `actions` in a batch.
    pub fn batch(actions: impl IntoIterator<Item = Action>) -> Self {
        Self::Batch(actions.into_iter().collect())
    }

    /// Returns a copy of this action with every section index passed through
    /// `f`, including the section component of every index path.
    ///
    /// Batches are re-addressed recursively. Item indices are untouched:
    /// composites only ever shift whole sections.
    pub fn map_sections<F>(&self, f: &F) -> Action
    where
        F: Fn(usize) -> usize,
    {
        let paths = |paths: &[IndexPath]| -> Vec<IndexPath> {
            paths.iter().map(|p| p.with_section(f(p.section))).collect()
        };
        let sections = |sections: &[usize]| -> Vec<usize> { sections.iter().map(|&s| f(s)).collect() };

        match self {
            Self::InsertItems(p) => Self::InsertItems(paths(p)),
            Self::DeleteItems(p) => Self::DeleteItems(paths(p)),
            Self::ReloadItems(p) => Self::ReloadItems(paths(p)),
            Self::MoveItem { from, to } => Self::MoveItem {
                from: from.with_section(f(from.section)),
                to: to.with_section(f(to.section)),
            },
            Self::InsertSections(s) => Self::InsertSections(sections(s)),
            Self::DeleteSections(s) => Self::DeleteSections(sections(s)),
            Self::ReloadSections(s) => Self::ReloadSections(sections(s)),
            Self::MoveSection { from, to } => Self::MoveSection {
                from: f(*from),
                to: f(*to),
            },
            Self::Batch(actions) => Self::Batch(actions.iter().map(|a| a.map_sections(f)).collect()),
        }
    }

    /// Returns `true` if applying this action changes the number of sections.
    ///
    /// Composites drop their section mapping when a child reports such an
    /// action. Moves and item-level actions never qualify.
    pub fn is_section_structural(&self) -> bool {
        match self {
            Self::InsertSections(_) | Self::DeleteSections(_) => true,
            Self::Batch(actions) => actions.iter().any(Action::is_section_structural),
            _ => false,
        }
    }

    /// Returns `true` if applying this action would change nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::InsertItems(p) | Self::DeleteItems(p) | Self::ReloadItems(p) => p.is_empty(),
            Self::InsertSections(s) | Self::DeleteSections(s) | Self::ReloadSections(s) => {
                s.is_empty()
            }
            Self::MoveItem { .. } | Self::MoveSection { .. } => false,
            Self::Batch(actions) => actions.iter().all(Action::is_empty),
        }
    }

    /// Number of leaf actions, counting each batch member recursively.
    pub fn len(&self) -> usize {
        match self {
            Self::Batch(actions) => actions.iter().map(Action::len).sum(),
            _ => 1,
        }
    }
}
