//! Error types for Horizon Sauce.
//!
//! Every variant describes a broken structural contract: a lookup that can
//! only fail when the data source tree is corrupt or the caller asked about
//! something it does not own. The `try_*` APIs return these errors; their
//! plain counterparts panic with the error's message.

use crate::id::SourceId;

/// The main error type for Horizon Sauce operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SauceError {
    /// A global section did not resolve to any child of a composite.
    #[error("section {section} is out of range for a composite with {section_count} sections")]
    SectionOutOfRange {
        /// The section that was looked up.
        section: usize,
        /// The composite's total section count at the time of the lookup.
        section_count: usize,
    },

    /// A composite was asked about a child it does not contain.
    #[error("data source {0} is not a child of this composite")]
    UnknownChild(SourceId),

    /// A leaf was asked for the position of an item it does not hold.
    #[error("item {0} is not contained in this data source")]
    ItemNotFound(String),

    /// An interactive move tried to carry an item from one child to another.
    #[error("cannot move an item from data source {from} to data source {to}")]
    CrossSourceMove {
        /// The child owning the source position.
        from: SourceId,
        /// The child owning the destination position.
        to: SourceId,
    },

    /// A global position resolved to a different child than the one asking.
    #[error("position belongs to data source {found}, not to {expected}")]
    ChildMismatch {
        /// The child that asked for the translation.
        expected: SourceId,
        /// The child that actually owns the position.
        found: SourceId,
    },
}

impl SauceError {
    /// Create an out-of-range error.
    pub fn section_out_of_range(section: usize, section_count: usize) -> Self {
        Self::SectionOutOfRange {
            section,
            section_count,
        }
    }

    /// Create an item-not-found error from the item's debug representation.
    pub fn item_not_found(item: &impl std::fmt::Debug) -> Self {
        Self::ItemNotFound(format!("{item:?}"))
    }
}

/// A specialized Result type for Horizon Sauce operations.
pub type Result<T> = std::result::Result<T, SauceError>;
