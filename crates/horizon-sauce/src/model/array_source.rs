//! Array-backed leaf data source.
//!
//! `ArrayDataSource<P>` shows one section holding an ordered list of unique
//! items. The list is loaded lazily from its [`ArrayProvider`] the first time
//! anything asks for it. Replacing it with [`ArrayDataSource::update_items`]
//! diffs the old and new lists and performs the resulting batch, so the
//! widget animates inserts, deletes and moves instead of reloading.

use std::any::Any;
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

use horizon_sauce_core::logging::targets;
use horizon_sauce_core::{Result, SauceError};

use super::data_source::{DataSource, DataSourceBase};
use super::diff::CollectionDiff;
use super::index_path::IndexPath;
use super::metrics::{ItemMetrics, SectionMetrics};
use super::view::{CollectionView, ReusableView};

/// The business logic behind an [`ArrayDataSource`].
///
/// # Example
///
/// ```
/// use horizon_sauce::model::{ArrayProvider, CollectionView, IndexPath, ReusableView};
///
/// struct Fruits;
///
/// impl ArrayProvider for Fruits {
///     type Item = String;
///
///     fn load_initial_items(&self) -> Vec<String> {
///         vec!["apple".into(), "pear".into()]
///     }
///
///     fn register_reusable_views(&self, view: &dyn CollectionView) {
///         view.register_cell("fruit");
///     }
///
///     fn cell_for_item(
///         &self,
///         view: &dyn CollectionView,
///         item: &String,
///         index_path: IndexPath,
///     ) -> ReusableView {
///         view.dequeue_reusable_cell("fruit", index_path).with_content(item.clone())
///     }
/// }
/// ```
pub trait ArrayProvider: Send + Sync + 'static {
    /// The item type. Items are matched by value when diffing, so every
    /// value must appear at most once in a list.
    type Item: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// Produces the list shown before the first update.
    fn load_initial_items(&self) -> Vec<Self::Item>;

    /// Registers every template [`cell_for_item`](ArrayProvider::cell_for_item) dequeues.
    fn register_reusable_views(&self, view: &dyn CollectionView);

    /// Produces the cell for `item`, displayed at `index_path`.
    fn cell_for_item(
        &self,
        view: &dyn CollectionView,
        item: &Self::Item,
        index_path: IndexPath,
    ) -> ReusableView;

    /// Produces a supplementary view of `kind` for the section. `None` by default.
    fn supplementary_view(
        &self,
        _view: &dyn CollectionView,
        _kind: &str,
        _index_path: IndexPath,
    ) -> Option<ReusableView> {
        None
    }

    /// Layout hints for the single section.
    fn metrics_for_section(&self) -> SectionMetrics {
        SectionMetrics::default()
    }

    /// Layout hints for `item`.
    fn metrics_for_item(&self, _item: &Self::Item, _index_path: IndexPath) -> ItemMetrics {
        ItemMetrics::default()
    }

    /// Whether `item` may be edited. Defaults to `false`.
    fn can_edit_item(&self, _item: &Self::Item, _index_path: IndexPath) -> bool {
        false
    }

    /// Whether `item` may be reordered interactively. Defaults to `false`.
    fn can_move_item(&self, _item: &Self::Item, _index_path: IndexPath) -> bool {
        false
    }
}

/// A single-section data source backed by an ordered list of unique items.
pub struct ArrayDataSource<P: ArrayProvider> {
    base: DataSourceBase,
    provider: P,
    items: RwLock<Option<Vec<P::Item>>>,
}

impl<P: ArrayProvider> ArrayDataSource<P> {
    /// Creates a data source whose items are not loaded yet.
    pub fn new(provider: P) -> Self {
        Self {
            base: DataSourceBase::new(),
            provider,
            items: RwLock::new(None),
        }
    }

    /// Creates a shared data source, ready to be added to a composite.
    pub fn new_shared(provider: P) -> Arc<Self> {
        Arc::new(Self::new(provider))
    }

    /// The provider this source delegates to.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Returns `true` once the items have been materialized.
    pub fn is_loaded(&self) -> bool {
        self.items.read().is_some()
    }

    /// A snapshot of the current items, loading them if needed.
    pub fn items(&self) -> Vec<P::Item> {
        self.with_items(<[P::Item]>::to_vec)
    }

    /// Number of items, loading them if needed.
    pub fn len(&self) -> usize {
        self.with_items(<[P::Item]>::len)
    }

    /// Returns `true` if there are no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The item displayed at `index_path`, if any.
    pub fn item(&self, index_path: IndexPath) -> Option<P::Item> {
        self.with_items(|items| items.get(index_path.item).cloned())
    }

    /// Position of `item` in the list.
    pub fn try_index_of(&self, item: &P::Item) -> Result<usize> {
        self.with_items(|items| items.iter().position(|candidate| candidate == item))
            .ok_or_else(|| SauceError::item_not_found(item))
    }

    /// Position of `item` in the list.
    ///
    /// # Panics
    ///
    /// Panics if `item` is not in the list.
    pub fn index_of(&self, item: &P::Item) -> usize {
        self.try_index_of(item).unwrap_or_else(|err| {
            tracing::error!(target: targets::ARRAY, source = %self.id(), %err, "index_of failed");
            panic!("{err}")
        })
    }

    /// Position of `item` as an index path in section 0.
    ///
    /// # Panics
    ///
    /// Panics if `item` is not in the list.
    pub fn index_path_of(&self, item: &P::Item) -> IndexPath {
        IndexPath::new(0, self.index_of(item))
    }

    /// Replaces the items and performs the diff against the previous list.
    ///
    /// If the items were never loaded, the previous list is empty and every
    /// new item is reported as an insertion.
    pub fn update_items(&self, items: Vec<P::Item>) {
        self.base.affinity().debug_assert_same_thread();
        warn_on_duplicates(self, &items);

        let diff = {
            let mut guard = self.items.write();
            let diff = CollectionDiff::new(guard.as_deref().unwrap_or(&[]), &items);
            *guard = Some(items);
            diff
        };

        tracing::debug!(
            target: targets::ARRAY,
            source = %self.id(),
            deleted = diff.deleted().len(),
            inserted = diff.inserted().len(),
            moved = diff.effective_moves().len(),
            "items updated"
        );
        diff.perform(self, 0);
    }

    /// Runs `f` on the items, loading them on first use.
    ///
    /// The provider is called without any lock held.
    fn with_items<R>(&self, f: impl FnOnce(&[P::Item]) -> R) -> R {
        if !self.is_loaded() {
            let loaded = self.provider.load_initial_items();
            warn_on_duplicates(self, &loaded);
            let mut guard = self.items.write();
            if guard.is_none() {
                tracing::trace!(
                    target: targets::ARRAY,
                    source = %self.id(),
                    count = loaded.len(),
                    "loaded initial items"
                );
                *guard = Some(loaded);
            }
        }

        let guard = self.items.read();
        f(guard.as_deref().unwrap_or(&[]))
    }
}

impl<P: ArrayProvider> DataSource for ArrayDataSource<P> {
    fn base(&self) -> &DataSourceBase {
        &self.base
    }

    fn number_of_sections(&self) -> usize {
        1
    }

    fn number_of_items(&self, _section: usize) -> usize {
        self.len()
    }

    fn cell_for_item(&self, view: &dyn CollectionView, index_path: IndexPath) -> ReusableView {
        match self.item(index_path) {
            Some(item) => self.provider.cell_for_item(view, &item, index_path),
            None => panic!("no item at {index_path} in data source {}", self.id()),
        }
    }

    fn register_reusable_views(&self, view: &dyn CollectionView) {
        self.provider.register_reusable_views(view);
    }

    fn item_at(&self, index_path: IndexPath) -> Option<Arc<dyn Any + Send + Sync>> {
        self.item(index_path)
            .map(|item| Arc::new(item) as Arc<dyn Any + Send + Sync>)
    }

    fn supplementary_view(
        &self,
        view: &dyn CollectionView,
        kind: &str,
        index_path: IndexPath,
    ) -> Option<ReusableView> {
        self.provider.supplementary_view(view, kind, index_path)
    }

    fn metrics_for_section(&self, _section: usize) -> SectionMetrics {
        self.provider.metrics_for_section()
    }

    fn metrics_for_item(&self, index_path: IndexPath) -> ItemMetrics {
        self.item(index_path)
            .map(|item| self.provider.metrics_for_item(&item, index_path))
            .unwrap_or_default()
    }

    fn can_edit_item(&self, index_path: IndexPath) -> bool {
        self.item(index_path)
            .is_some_and(|item| self.provider.can_edit_item(&item, index_path))
    }

    fn can_move_item(&self, index_path: IndexPath) -> bool {
        self.item(index_path)
            .is_some_and(|item| self.provider.can_move_item(&item, index_path))
    }

    fn move_item(&self, from: IndexPath, to: IndexPath) {
        self.base.affinity().debug_assert_same_thread();
        if from.item == to.item || !self.can_move_item(from) {
            return;
        }

        let mut guard = self.items.write();
        if let Some(items) = guard.as_mut()
            && from.item < items.len()
        {
            let item = items.remove(from.item);
            let to = to.item.min(items.len());
            items.insert(to, item);
            tracing::trace!(
                target: targets::ARRAY,
                source = %self.id(),
                from = from.item,
                to,
                "item moved interactively"
            );
        }
    }

    fn type_name(&self) -> &'static str {
        "ArrayDataSource"
    }
}

impl<P: ArrayProvider + Debug> Debug for ArrayDataSource<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayDataSource")
            .field("id", &self.id())
            .field("provider", &self.provider)
            .field("items", &*self.items.read())
            .finish()
    }
}

fn warn_on_duplicates<P: ArrayProvider>(source: &ArrayDataSource<P>, items: &[P::Item]) {
    let mut seen = HashSet::with_capacity(items.len());
    if let Some(duplicate) = items.iter().find(|item| !seen.insert(*item)) {
        tracing::warn!(
            target: targets::ARRAY,
            source = %source.id(),
            ?duplicate,
            "duplicate item; diffs against this list may be wrong"
        );
    }
}
