//! Composite data source.
//!
//! `ComposedDataSource` owns an ordered list of child sources and presents
//! their sections back to back as one contiguous range. It translates
//! positions between its own (global) coordinate space and each child's
//! (local) one, in both directions, and re-addresses every action a child
//! performs before passing it on to its own container.
//!
//! # Section Mapping
//!
//! The child-to-range mapping is cached as a [`SectionMapping`] snapshot.
//! It is dropped when the children list changes or when a child reports an
//! action that inserts or deletes sections, and rebuilt on the next query.
//! Rebuilding asks every child for its section count without holding any of
//! this composite's locks, so children may call back into it freely.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_sauce::model::{
//!     ArrayDataSource, ArrayProvider, CollectionView, ComposedDataSource, DataSource,
//!     IndexPath, ReusableView,
//! };
//!
//! struct Numbers(Vec<u32>);
//!
//! impl ArrayProvider for Numbers {
//!     type Item = u32;
//!
//!     fn load_initial_items(&self) -> Vec<u32> {
//!         self.0.clone()
//!     }
//!
//!     fn register_reusable_views(&self, view: &dyn CollectionView) {
//!         view.register_cell("number");
//!     }
//!
//!     fn cell_for_item(&self, view: &dyn CollectionView, item: &u32, index_path: IndexPath) -> ReusableView {
//!         view.dequeue_reusable_cell("number", index_path).with_content(item.to_string())
//!     }
//! }
//!
//! let odd = ArrayDataSource::new_shared(Numbers(vec![1, 3, 5]));
//! let even = ArrayDataSource::new_shared(Numbers(vec![2, 4]));
//!
//! let composite = ComposedDataSource::builder()
//!     .child(odd.clone())
//!     .child(even.clone())
//!     .build();
//!
//! assert_eq!(composite.number_of_sections(), 2);
//! assert_eq!(composite.number_of_items(1), 2);
//! assert_eq!(composite.unmap(even.id(), 0), 1);
//! ```

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use horizon_sauce_core::logging::targets;
use horizon_sauce_core::{PerfSpan, Result, SauceError, SourceId};

use super::action::Action;
use super::data_source::{DataSource, DataSourceBase, DataSourceContainer};
use super::index_path::IndexPath;
use super::mapping::SectionMapping;
use super::metrics::{ItemMetrics, SectionMetrics};
use super::view::{CollectionView, ReusableView};

/// A data source that flattens its children's sections into one range.
///
/// Always lives in an `Arc`: it hands weak references to itself to its
/// children as their container.
pub struct ComposedDataSource {
    base: DataSourceBase,
    this: Weak<ComposedDataSource>,
    children: RwLock<Vec<Arc<dyn DataSource>>>,
    /// `None` while stale.
    mapping: RwLock<Option<Arc<SectionMapping>>>,
    moving_enabled: AtomicBool,
}

impl ComposedDataSource {
    /// Creates an empty composite.
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            base: DataSourceBase::new(),
            this: this.clone(),
            children: RwLock::new(Vec::new()),
            mapping: RwLock::new(None),
            moving_enabled: AtomicBool::new(false),
        })
    }

    /// Starts building a composite.
    pub fn builder() -> ComposedDataSourceBuilder {
        ComposedDataSourceBuilder::new()
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// A snapshot of the children, in order.
    pub fn children(&self) -> Vec<Arc<dyn DataSource>> {
        self.children.read().clone()
    }

    /// Number of direct children.
    pub fn number_of_children(&self) -> usize {
        self.children.read().len()
    }

    /// Position of `child` among the children.
    pub fn index_of_child(&self, child: SourceId) -> Option<usize> {
        self.children.read().iter().position(|c| c.id() == child)
    }

    /// Returns `true` if `child` is a direct child.
    pub fn contains(&self, child: SourceId) -> bool {
        self.index_of_child(child).is_some()
    }

    /// Adds `child` at `index`, or at the end when `index` is `None`.
    ///
    /// Does nothing if `child` is already present. Otherwise the child
    /// inherits the composite's editing flag and `InsertSections` is
    /// performed for every section it brings.
    pub fn add(&self, child: Arc<dyn DataSource>, index: Option<usize>) {
        self.base.affinity().debug_assert_same_thread();
        if self.contains(child.id()) {
            tracing::trace!(
                target: targets::COMPOSE,
                composite = %self.id(),
                child = %child.id(),
                "child already present"
            );
            return;
        }

        let position = {
            let mut children = self.children.write();
            let position = index.map_or(children.len(), |i| i.min(children.len()));
            children.insert(position, Arc::clone(&child));
            position
        };
        self.attach(&child);
        self.invalidate_mapping();

        if let Some(view) = self.attached_view() {
            child.register_reusable_views(view.as_ref());
        }

        let range = fatal(self.id(), self.try_section_indices(child.id()));
        tracing::debug!(
            target: targets::COMPOSE,
            composite = %self.id(),
            child = %child.id(),
            position,
            sections = ?range,
            "child added"
        );
        if !range.is_empty() {
            self.perform(Action::InsertSections(range.collect()));
        }
    }

    /// Removes `child`, performing `DeleteSections` for the sections it
    /// occupied. Returns `false` if it was not a child.
    pub fn remove(&self, child: &dyn DataSource) -> bool {
        self.base.affinity().debug_assert_same_thread();
        let Ok(range) = self.try_section_indices(child.id()) else {
            tracing::trace!(
                target: targets::COMPOSE,
                composite = %self.id(),
                child = %child.id(),
                "not a child, nothing to remove"
            );
            return false;
        };

        self.children.write().retain(|c| c.id() != child.id());
        self.detach(child);
        self.invalidate_mapping();

        tracing::debug!(
            target: targets::COMPOSE,
            composite = %self.id(),
            child = %child.id(),
            sections = ?range,
            "child removed"
        );
        if !range.is_empty() {
            self.perform(Action::DeleteSections(range.collect()));
        }
        true
    }

    /// Replaces the children with `children`.
    ///
    /// Does nothing if the new list holds the same sources in the same
    /// order. Otherwise performs one batch: `DeleteSections` for the
    /// sections of removed children (pre-update indices), a `MoveSection`
    /// for every section of a kept child whose index changed, then
    /// `InsertSections` for the sections of added children (final indices).
    ///
    /// A source listed twice is only kept at its first position.
    pub fn update_children(&self, children: impl IntoIterator<Item = Arc<dyn DataSource>>) {
        self.base.affinity().debug_assert_same_thread();
        let new_children = dedup_children(self.id(), children);
        let old_children = self.children();

        if same_identities(&old_children, &new_children) {
            tracing::trace!(
                target: targets::COMPOSE,
                composite = %self.id(),
                "children unchanged"
            );
            return;
        }

        let _perf = PerfSpan::new("compose.update_children");
        let old_mapping = self.mapping();

        let old_ids: HashSet<SourceId> = old_children.iter().map(|c| c.id()).collect();
        let new_ids: HashSet<SourceId> = new_children.iter().map(|c| c.id()).collect();
        let removed: Vec<Arc<dyn DataSource>> = old_children
            .iter()
            .filter(|c| !new_ids.contains(&c.id()))
            .cloned()
            .collect();
        let added: Vec<Arc<dyn DataSource>> = new_children
            .iter()
            .filter(|c| !old_ids.contains(&c.id()))
            .cloned()
            .collect();

        *self.children.write() = new_children.clone();
        for child in &removed {
            self.detach(child.as_ref());
        }
        for child in &added {
            self.attach(child);
        }
        self.invalidate_mapping();
        let new_mapping = self.mapping();

        if let Some(view) = self.attached_view() {
            for child in &added {
                child.register_reusable_views(view.as_ref());
            }
        }

        let deleted: Vec<usize> = removed
            .iter()
            .filter_map(|c| old_mapping.section_range(c.id()).ok())
            .flatten()
            .collect();
        let moves: Vec<Action> = new_children
            .iter()
            .filter(|c| old_ids.contains(&c.id()))
            .filter_map(|c| {
                let from = old_mapping.section_range(c.id()).ok()?;
                let to = new_mapping.section_range(c.id()).ok()?;
                Some(from.zip(to))
            })
            .flatten()
            .filter(|(from, to)| from != to)
            .map(|(from, to)| Action::MoveSection { from, to })
            .collect();
        let inserted: Vec<usize> = added
            .iter()
            .filter_map(|c| new_mapping.section_range(c.id()).ok())
            .flatten()
            .collect();

        tracing::debug!(
            target: targets::COMPOSE,
            composite = %self.id(),
            added = added.len(),
            removed = removed.len(),
            deleted_sections = deleted.len(),
            moved_sections = moves.len(),
            inserted_sections = inserted.len(),
            "children updated"
        );

        let mut actions = Vec::with_capacity(moves.len() + 2);
        if !deleted.is_empty() {
            actions.push(Action::DeleteSections(deleted));
        }
        actions.extend(moves);
        if !inserted.is_empty() {
            actions.push(Action::InsertSections(inserted));
        }
        if !actions.is_empty() {
            self.perform(Action::Batch(actions));
        }
    }

    // =========================================================================
    // Mapping
    // =========================================================================

    /// The current section mapping, rebuilt if stale.
    pub fn mapping(&self) -> Arc<SectionMapping> {
        if let Some(mapping) = self.mapping.read().as_ref() {
            return Arc::clone(mapping);
        }

        let _perf = PerfSpan::new("compose.rebuild_mapping");
        let children = self.children();
        let mapping = Arc::new(SectionMapping::build(&children));
        tracing::trace!(
            target: targets::COMPOSE,
            composite = %self.id(),
            children = mapping.len(),
            sections = mapping.total(),
            "mapping rebuilt"
        );
        *self.mapping.write() = Some(Arc::clone(&mapping));
        mapping
    }

    /// Returns `true` if the cached mapping is current.
    pub fn is_mapping_valid(&self) -> bool {
        self.mapping.read().is_some()
    }

    fn invalidate_mapping(&self) {
        *self.mapping.write() = None;
    }

    /// Resolves a global section to its owning child and local section.
    pub fn try_map(&self, section: usize) -> Result<(Arc<dyn DataSource>, usize)> {
        let mapping = self.mapping();
        mapping
            .map(section)
            .map(|(child, local)| (Arc::clone(child), local))
    }

    /// Resolves a global section to its owning child and local section.
    ///
    /// # Panics
    ///
    /// Panics if no child owns `section`.
    pub fn map(&self, section: usize) -> (Arc<dyn DataSource>, usize) {
        fatal(self.id(), self.try_map(section))
    }

    /// Resolves a global position to its owning child and local position.
    pub fn try_map_index_path(&self, index_path: IndexPath) -> Result<(Arc<dyn DataSource>, IndexPath)> {
        self.try_map(index_path.section)
            .map(|(child, local)| (child, index_path.with_section(local)))
    }

    /// Resolves a global position to its owning child and local position.
    ///
    /// # Panics
    ///
    /// Panics if no child owns the position's section.
    pub fn map_index_path(&self, index_path: IndexPath) -> (Arc<dyn DataSource>, IndexPath) {
        fatal(self.id(), self.try_map_index_path(index_path))
    }

    /// Translates `child`'s local section into a global one.
    pub fn try_unmap(&self, child: SourceId, section: usize) -> Result<usize> {
        self.mapping().unmap(child, section)
    }

    /// Translates `child`'s local section into a global one.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a child of this composite.
    pub fn unmap(&self, child: SourceId, section: usize) -> usize {
        fatal(self.id(), self.try_unmap(child, section))
    }

    /// Translates `child`'s local position into a global one.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a child of this composite.
    pub fn unmap_index_path(&self, child: SourceId, index_path: IndexPath) -> IndexPath {
        index_path.with_section(self.unmap(child, index_path.section))
    }

    /// The global sections `child` occupies.
    pub fn try_section_indices(&self, child: SourceId) -> Result<Range<usize>> {
        self.mapping().section_range(child)
    }

    /// The global sections `child` occupies.
    ///
    /// # Panics
    ///
    /// Panics if `child` is not a child of this composite.
    pub fn section_indices(&self, child: SourceId) -> Range<usize> {
        fatal(self.id(), self.try_section_indices(child))
    }

    /// The direct child owning the global position, if any.
    pub fn child_source_at(&self, index_path: IndexPath) -> Option<Arc<dyn DataSource>> {
        self.try_map(index_path.section).ok().map(|(child, _)| child)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Whether the user may reorder items.
    pub fn is_moving_enabled(&self) -> bool {
        self.moving_enabled.load(Ordering::Relaxed)
    }

    /// Enables or disables interactive reordering for the whole subtree.
    pub fn set_moving_enabled(&self, enabled: bool) {
        self.moving_enabled.store(enabled, Ordering::Relaxed);
    }

    fn as_container(&self) -> Weak<dyn DataSourceContainer> {
        self.this.clone()
    }

    /// Links `child` to this composite. A child that still belongs to another
    /// composite stays in that composite's list; only the container link
    /// moves, and the old parent will no longer unlink it on removal.
    fn attach(&self, child: &Arc<dyn DataSource>) {
        if child.container().is_some_and(|c| !self.is_container_of(&c)) {
            tracing::warn!(
                target: targets::COMPOSE,
                composite = %self.id(),
                child = %child.id(),
                "child already has a container, re-parenting"
            );
        }
        child.set_container(Some(self.as_container()));
        child.set_editing(self.is_editing());
    }

    /// Clears the container link of `child` if it still points here.
    fn detach(&self, child: &dyn DataSource) {
        if child.container().is_some_and(|c| self.is_container_of(&c)) {
            child.set_container(None);
        }
    }

    fn is_container_of(&self, container: &Arc<dyn DataSourceContainer>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(container), self as *const Self)
    }
}

impl DataSource for ComposedDataSource {
    fn base(&self) -> &DataSourceBase {
        &self.base
    }

    fn number_of_sections(&self) -> usize {
        self.mapping().total()
    }

    fn number_of_items(&self, section: usize) -> usize {
        let (child, local) = self.map(section);
        child.number_of_items(local)
    }

    fn cell_for_item(&self, view: &dyn CollectionView, index_path: IndexPath) -> ReusableView {
        let (child, local) = self.map_index_path(index_path);
        let mut cell = child.cell_for_item(view, local);
        cell.index_path = index_path;
        cell
    }

    fn register_reusable_views(&self, view: &dyn CollectionView) {
        for child in self.children() {
            child.register_reusable_views(view);
        }
    }

    fn item_at(&self, index_path: IndexPath) -> Option<Arc<dyn Any + Send + Sync>> {
        let (child, local) = self.try_map_index_path(index_path).ok()?;
        child.item_at(local)
    }

    fn supplementary_view(
        &self,
        view: &dyn CollectionView,
        kind: &str,
        index_path: IndexPath,
    ) -> Option<ReusableView> {
        let (child, local) = self.map_index_path(index_path);
        child.supplementary_view(view, kind, local).map(|mut supplementary| {
            supplementary.index_path = index_path;
            supplementary
        })
    }

    fn metrics_for_section(&self, section: usize) -> SectionMetrics {
        let (child, local) = self.map(section);
        child.metrics_for_section(local)
    }

    fn metrics_for_item(&self, index_path: IndexPath) -> ItemMetrics {
        let (child, local) = self.map_index_path(index_path);
        child.metrics_for_item(local)
    }

    fn can_edit_item(&self, index_path: IndexPath) -> bool {
        let (child, local) = self.map_index_path(index_path);
        child.can_edit_item(local)
    }

    fn can_move_item(&self, index_path: IndexPath) -> bool {
        if !self.is_moving_enabled() {
            return false;
        }
        let (child, local) = self.map_index_path(index_path);
        child.can_move_item(local)
    }

    /// # Panics
    ///
    /// Panics if `from` and `to` belong to different children.
    fn move_item(&self, from: IndexPath, to: IndexPath) {
        let (source, local_from) = self.map_index_path(from);
        let (target, local_to) = self.map_index_path(to);
        if source.id() != target.id() {
            fail(
                self.id(),
                SauceError::CrossSourceMove {
                    from: source.id(),
                    to: target.id(),
                },
            );
        }
        source.move_item(local_from, local_to);
    }

    fn children(&self) -> Vec<Arc<dyn DataSource>> {
        ComposedDataSource::children(self)
    }

    fn set_editing(&self, editing: bool) {
        self.base.set_editing(editing);
        for child in self.children() {
            child.set_editing(editing);
        }
    }

    fn type_name(&self) -> &'static str {
        "ComposedDataSource"
    }
}

impl DataSourceContainer for ComposedDataSource {
    fn collection_view(&self) -> Option<Arc<dyn CollectionView>> {
        self.attached_view()
    }

    fn global_index_path(&self, local: IndexPath, child: SourceId) -> Option<IndexPath> {
        let container = self.container()?;
        let own = self.unmap_index_path(child, local);
        container.global_index_path(own, self.id())
    }

    fn local_index_path(&self, global: IndexPath, child: SourceId) -> Option<IndexPath> {
        let own = self.container()?.local_index_path(global, self.id())?;
        let (owner, local) = self.map_index_path(own);
        if owner.id() != child {
            fail(
                self.id(),
                SauceError::ChildMismatch {
                    expected: child,
                    found: owner.id(),
                },
            );
        }
        Some(local)
    }

    fn data_source_performed(&self, source: SourceId, action: Action) {
        let offset = self.section_indices(source).start;
        let relayed = if offset == 0 {
            action
        } else {
            action.map_sections(&|section| section + offset)
        };

        if relayed.is_section_structural() {
            self.invalidate_mapping();
        }
        tracing::trace!(
            target: targets::COMPOSE,
            composite = %self.id(),
            child = %source,
            offset,
            action = ?relayed,
            "relaying child action"
        );
        self.perform(relayed);
    }
}

impl fmt::Debug for ComposedDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children: Vec<SourceId> = self.children.read().iter().map(|c| c.id()).collect();
        f.debug_struct("ComposedDataSource")
            .field("id", &self.id())
            .field("children", &children)
            .field("mapping_valid", &self.is_mapping_valid())
            .field("moving_enabled", &self.is_moving_enabled())
            .field("editing", &self.is_editing())
            .finish()
    }
}

static_assertions::assert_impl_all!(ComposedDataSource: Send, Sync);

/// Builder pattern for creating composites.
#[derive(Default)]
pub struct ComposedDataSourceBuilder {
    children: Vec<Arc<dyn DataSource>>,
    moving_enabled: bool,
    editing: bool,
}

impl ComposedDataSourceBuilder {
    /// Creates a builder with no children.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends several children.
    pub fn children(mut self, children: impl IntoIterator<Item = Arc<dyn DataSource>>) -> Self {
        self.children.extend(children);
        self
    }

    /// Appends one child.
    pub fn child(mut self, child: Arc<dyn DataSource>) -> Self {
        self.children.push(child);
        self
    }

    /// Allows interactive reordering.
    pub fn moving_enabled(mut self, enabled: bool) -> Self {
        self.moving_enabled = enabled;
        self
    }

    /// Starts in editing mode.
    pub fn editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }

    /// Builds the composite. Nothing is performed: it has no container yet.
    pub fn build(self) -> Arc<ComposedDataSource> {
        let composite = ComposedDataSource::new();
        composite.set_moving_enabled(self.moving_enabled);
        composite.base.set_editing(self.editing);

        let children = dedup_children(composite.id(), self.children);
        for child in &children {
            composite.attach(child);
        }
        *composite.children.write() = children;
        composite
    }
}

/// Drops every repeated source, keeping its first position.
fn dedup_children(
    composite: SourceId,
    children: impl IntoIterator<Item = Arc<dyn DataSource>>,
) -> Vec<Arc<dyn DataSource>> {
    let mut seen = HashSet::new();
    children
        .into_iter()
        .filter(|child| {
            let first = seen.insert(child.id());
            if !first {
                tracing::warn!(
                    target: targets::COMPOSE,
                    %composite,
                    child = %child.id(),
                    "duplicate child ignored"
                );
            }
            first
        })
        .collect()
}

fn same_identities(a: &[Arc<dyn DataSource>], b: &[Arc<dyn DataSource>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.id() == y.id())
}

fn fatal<T>(composite: SourceId, result: Result<T>) -> T {
    result.unwrap_or_else(|err| fail(composite, err))
}

fn fail(composite: SourceId, err: SauceError) -> ! {
    tracing::error!(target: targets::COMPOSE, %composite, %err, "composite contract violated");
    panic!("{err}")
}
