//! Stable identity for nodes in a data source tree.
//!
//! Composites decide membership by identity, never by value: two sources
//! with identical contents are still different children. Every source gets a
//! [`SourceId`] when it is constructed and keeps it for its whole lifetime.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A global counter for generating unique source IDs.
static SOURCE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// A unique, stable identifier for a data source.
///
/// IDs are never reused within a process. They are cheap to copy and compare,
/// and are what composites use to recognise their children.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    /// Allocate a fresh identifier.
    #[inline]
    pub fn next() -> Self {
        Self(SOURCE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Convert the SourceId to a raw u64 value.
    #[inline]
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.0)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

static_assertions::assert_impl_all!(SourceId: Send, Sync, Copy);
