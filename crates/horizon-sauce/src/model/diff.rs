//! Diffing of ordered snapshots into replayable edit scripts.
//!
//! [`CollectionDiff`] compares two orderings of uniquely identifiable
//! elements and splits the difference into deletions, insertions and moves.
//! The result can be replayed as a single [`Action::Batch`], either at item
//! granularity inside one section or directly on section indices.
//!
//! The script is sound, not minimal: every element present in both
//! snapshots gets a move entry, even when its index did not change, unless
//! the snapshots differ only by order. Widgets treat a move onto the same
//! index as a no-op, so the redundant entries cost nothing but a few
//! comparisons.
//!
//! # Example
//!
//! ```
//! use horizon_sauce::model::{Action, CollectionDiff, IndexPath};
//!
//! let diff = CollectionDiff::new(&["a", "b", "c"], &["b", "c", "d"]);
//! assert_eq!(diff.deleted(), &[0]);
//! assert_eq!(diff.inserted(), &[2]);
//! assert_eq!(diff.moved(), &[(1, 0), (2, 1)]);
//!
//! let action = diff.item_action(0).unwrap();
//! assert_eq!(
//!     action,
//!     Action::batch([
//!         Action::DeleteItems(vec![IndexPath::new(0, 0)]),
//!         Action::InsertItems(vec![IndexPath::new(0, 2)]),
//!         Action::MoveItem { from: IndexPath::new(0, 1), to: IndexPath::new(0, 0) },
//!         Action::MoveItem { from: IndexPath::new(0, 2), to: IndexPath::new(0, 1) },
//!     ])
//! );
//! ```

use std::collections::HashMap;
use std::hash::Hash;

use horizon_sauce_core::logging::targets;

use super::action::Action;
use super::data_source::DataSource;
use super::index_path::IndexPath;

/// The edit sets that turn one ordering into another.
///
/// Elements are matched by value, so each snapshot must hold every value at
/// most once. With duplicates the first occurrence wins and the script is
/// no longer guaranteed to replay correctly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectionDiff {
    deleted: Vec<usize>,
    inserted: Vec<usize>,
    moved: Vec<(usize, usize)>,
}

impl CollectionDiff {
    /// Computes the difference between `old` and `new`.
    ///
    /// - `deleted`: indices in `old` whose value is absent from `new`, in
    ///   descending order so tail-first deletion never shifts a pending index.
    /// - `inserted`: indices in `new` whose value is absent from `old`, in
    ///   ascending order.
    /// - `moved`: `(index in old, index in new)` for every value present in
    ///   both, in `old` order.
    pub fn new<T>(old: &[T], new: &[T]) -> Self
    where
        T: Hash + Eq,
    {
        let old_positions = first_positions(old);
        let new_positions = first_positions(new);

        let deleted: Vec<usize> = old
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, element)| !new_positions.contains_key(element))
            .map(|(offset, _)| offset)
            .collect();

        let inserted: Vec<usize> = new
            .iter()
            .enumerate()
            .filter(|(_, element)| !old_positions.contains_key(element))
            .map(|(offset, _)| offset)
            .collect();

        let moved: Vec<(usize, usize)> = old
            .iter()
            .enumerate()
            .filter_map(|(offset, element)| new_positions.get(element).map(|&to| (offset, to)))
            .collect();

        tracing::trace!(
            target: targets::DIFF,
            old_len = old.len(),
            new_len = new.len(),
            deleted = deleted.len(),
            inserted = inserted.len(),
            moved = moved.len(),
            "computed diff"
        );

        Self {
            deleted,
            inserted,
            moved,
        }
    }

    /// Indices in the old snapshot that were removed, descending.
    pub fn deleted(&self) -> &[usize] {
        &self.deleted
    }

    /// Indices in the new snapshot that were added, ascending.
    pub fn inserted(&self) -> &[usize] {
        &self.inserted
    }

    /// `(old index, new index)` for every element kept, including ones that
    /// stayed in place.
    pub fn moved(&self) -> &[(usize, usize)] {
        &self.moved
    }

    /// The moves that will actually be replayed.
    ///
    /// When nothing was inserted or deleted, pairs with equal indices are
    /// true no-ops and are dropped. Otherwise every pair is kept, because the
    /// surrounding insertions and deletions shift what those indices mean.
    pub fn effective_moves(&self) -> Vec<(usize, usize)> {
        if self.deleted.is_empty() && self.inserted.is_empty() {
            self.moved.iter().copied().filter(|(from, to)| from != to).collect()
        } else {
            self.moved.clone()
        }
    }

    /// Returns `true` if replaying this diff would emit nothing.
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.inserted.is_empty() && self.effective_moves().is_empty()
    }

    /// Builds the item-level batch for the given section, or `None` if there
    /// is nothing to do.
    ///
    /// The batch holds one `DeleteItems` (if any), then one `InsertItems`
    /// (if any), then one `MoveItem` per effective move.
    pub fn item_action(&self, section: usize) -> Option<Action> {
        let path = |item: usize| IndexPath::new(section, item);
        self.build_batch(
            |deleted| Action::DeleteItems(deleted.iter().map(|&i| path(i)).collect()),
            |inserted| Action::InsertItems(inserted.iter().map(|&i| path(i)).collect()),
            |from, to| Action::MoveItem {
                from: path(from),
                to: path(to),
            },
        )
    }

    /// Builds the section-level batch, shifting every index by `offset`, or
    /// `None` if there is nothing to do.
    pub fn section_action(&self, offset: usize) -> Option<Action> {
        self.build_batch(
            |deleted| Action::DeleteSections(deleted.iter().map(|&s| s + offset).collect()),
            |inserted| Action::InsertSections(inserted.iter().map(|&s| s + offset).collect()),
            |from, to| Action::MoveSection {
                from: from + offset,
                to: to + offset,
            },
        )
    }

    /// Replays this diff on `source` as items of `section`.
    ///
    /// Emits nothing when the diff is empty.
    pub fn perform(&self, source: &dyn DataSource, section: usize) {
        if let Some(action) = self.item_action(section) {
            source.perform(action);
        }
    }

    /// Replays this diff on `source` as sections, shifted by `offset`.
    ///
    /// Emits nothing when the diff is empty.
    pub fn perform_on_sections(&self, source: &dyn DataSource, offset: usize) {
        if let Some(action) = self.section_action(offset) {
            source.perform(action);
        }
    }

    fn build_batch(
        &self,
        delete: impl FnOnce(&[usize]) -> Action,
        insert: impl FnOnce(&[usize]) -> Action,
        mv: impl Fn(usize, usize) -> Action,
    ) -> Option<Action> {
        let moves = self.effective_moves();
        if self.deleted.is_empty() && self.inserted.is_empty() && moves.is_empty() {
            return None;
        }

        let mut actions = Vec::with_capacity(2 + moves.len());
        if !self.deleted.is_empty() {
            actions.push(delete(&self.deleted));
        }
        if !self.inserted.is_empty() {
            actions.push(insert(&self.inserted));
        }
        actions.extend(moves.into_iter().map(|(from, to)| mv(from, to)));

        Some(Action::Batch(actions))
    }
}

/// Maps each distinct value to the index of its first occurrence.
fn first_positions<T: Hash + Eq>(items: &[T]) -> HashMap<&T, usize> {
    let mut positions = HashMap::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        positions.entry(item).or_insert(index);
    }
    positions
}
