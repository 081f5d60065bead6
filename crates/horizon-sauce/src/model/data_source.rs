//! The data source and container contracts.
//!
//! A data source tree is made of [`DataSource`] nodes. Leaves own items;
//! composites own other sources and flatten their sections into one
//! contiguous range. Ownership only flows downwards: a parent holds its
//! children in `Arc`s, while each child reaches its parent through a weak
//! [`DataSourceContainer`] reference that never keeps the parent alive.
//!
//! When a source mutates, it describes the change with one [`Action`] and
//! hands it to its container via [`DataSource::perform`]. Containers
//! re-address the action and pass it upwards until the root host applies it
//! to the [`CollectionView`].

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use horizon_sauce_core::{SourceId, ThreadAffinity};

use super::action::Action;
use super::index_path::IndexPath;
use super::metrics::{ItemMetrics, SectionMetrics};
use super::view::{CollectionView, ReusableView};

/// The upward half of the tree: what a child may ask of its parent.
///
/// Implemented by [`ComposedDataSource`](super::ComposedDataSource) and by
/// the root [`CollectionHost`](super::CollectionHost).
pub trait DataSourceContainer: Send + Sync {
    /// The widget the tree is attached to, if it is loaded.
    fn collection_view(&self) -> Option<Arc<dyn CollectionView>>;

    /// Translates a position in `child`'s coordinate space to the root's.
    ///
    /// Returns `None` when no widget is attached.
    fn global_index_path(&self, local: IndexPath, child: SourceId) -> Option<IndexPath>;

    /// Translates a root position into `child`'s coordinate space.
    ///
    /// Returns `None` when no widget is attached.
    fn local_index_path(&self, global: IndexPath, child: SourceId) -> Option<IndexPath>;

    /// Receives an action performed by `source`, expressed in the source's
    /// own coordinate space.
    fn data_source_performed(&self, source: SourceId, action: Action);
}

/// A node in a data source tree.
///
/// Implementors embed a [`DataSourceBase`] and return it from
/// [`base`](DataSource::base); identity, the container link and the editing
/// flag are provided on top of it.
///
/// # Implementation Requirements
///
/// At minimum, you must implement:
/// - [`base`](DataSource::base)
/// - [`number_of_sections`](DataSource::number_of_sections)
/// - [`number_of_items`](DataSource::number_of_items)
/// - [`cell_for_item`](DataSource::cell_for_item)
/// - [`register_reusable_views`](DataSource::register_reusable_views)
/// - [`item_at`](DataSource::item_at)
///
/// Positions passed in are always in this source's own coordinate space.
pub trait DataSource: Send + Sync {
    /// Shared per-node state.
    fn base(&self) -> &DataSourceBase;

    /// Number of sections this source contributes.
    fn number_of_sections(&self) -> usize;

    /// Number of items in `section`.
    fn number_of_items(&self, section: usize) -> usize;

    /// Produces the view displaying the item at `index_path`.
    ///
    /// `index_path` is local to this source. A composite stamps the returned
    /// view with the position it was asked for, so the view reaching the
    /// widget carries the global position.
    fn cell_for_item(&self, view: &dyn CollectionView, index_path: IndexPath) -> ReusableView;

    /// Registers every template this source dequeues.
    fn register_reusable_views(&self, view: &dyn CollectionView);

    /// The item displayed at `index_path`, type-erased.
    fn item_at(&self, index_path: IndexPath) -> Option<Arc<dyn Any + Send + Sync>>;

    // -------------------------------------------------------------------------
    // Optional methods with default implementations
    // -------------------------------------------------------------------------

    /// Produces a header, footer or other supplementary view.
    fn supplementary_view(
        &self,
        _view: &dyn CollectionView,
        _kind: &str,
        _index_path: IndexPath,
    ) -> Option<ReusableView> {
        None
    }

    /// Layout hints for `section`.
    fn metrics_for_section(&self, _section: usize) -> SectionMetrics {
        SectionMetrics::default()
    }

    /// Layout hints for the item at `index_path`.
    fn metrics_for_item(&self, _index_path: IndexPath) -> ItemMetrics {
        ItemMetrics::default()
    }

    /// Whether the item at `index_path` may be edited.
    fn can_edit_item(&self, _index_path: IndexPath) -> bool {
        false
    }

    /// Whether the user may drag the item at `index_path`.
    fn can_move_item(&self, _index_path: IndexPath) -> bool {
        false
    }

    /// Called after the user dragged an item from `from` to `to`.
    ///
    /// The widget already shows the new order, so implementations update
    /// their model without performing an action.
    fn move_item(&self, _from: IndexPath, _to: IndexPath) {}

    /// Direct children, for composites. Leaves have none.
    fn children(&self) -> Vec<Arc<dyn DataSource>> {
        Vec::new()
    }

    /// Human-readable name used by debug output.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    // -------------------------------------------------------------------------
    // Provided methods
    // -------------------------------------------------------------------------

    /// This source's stable identity.
    fn id(&self) -> SourceId {
        self.base().id()
    }

    /// The current container, if attached and still alive.
    fn container(&self) -> Option<Arc<dyn DataSourceContainer>> {
        self.base().container()
    }

    /// Replaces the container link. Called by composites on add/remove.
    fn set_container(&self, container: Option<Weak<dyn DataSourceContainer>>) {
        self.base().set_container(container);
    }

    /// Whether the source is in editing mode.
    fn is_editing(&self) -> bool {
        self.base().is_editing()
    }

    /// Switches editing mode. Composites propagate it to their children.
    fn set_editing(&self, editing: bool) {
        self.base().set_editing(editing);
    }

    /// The widget this source ends up in, if the tree is attached and loaded.
    fn attached_view(&self) -> Option<Arc<dyn CollectionView>> {
        self.container().and_then(|container| container.collection_view())
    }

    /// Translates a local position to the root's coordinate space.
    fn to_global_index_path(&self, local: IndexPath) -> Option<IndexPath> {
        self.container()?.global_index_path(local, self.id())
    }

    /// Translates a root position into this source's coordinate space.
    fn to_local_index_path(&self, global: IndexPath) -> Option<IndexPath> {
        self.container()?.local_index_path(global, self.id())
    }

    /// Sends `action` to the container. Dropped when there is none.
    fn perform(&self, action: Action) {
        match self.container() {
            Some(container) => container.data_source_performed(self.id(), action),
            None => horizon_sauce_core::sauce_trace!(
                source = %self.id(),
                ?action,
                "no container, dropping action"
            ),
        }
    }
}

/// State every data source carries: identity, container link, editing flag.
///
/// This is the data source equivalent of an object base: embed it and return
/// it from [`DataSource::base`].
#[derive(Debug)]
pub struct DataSourceBase {
    id: SourceId,
    container: RwLock<Option<Weak<dyn DataSourceContainer>>>,
    editing: AtomicBool,
    affinity: ThreadAffinity,
}

impl Default for DataSourceBase {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSourceBase {
    /// Creates a detached base with a fresh identity.
    pub fn new() -> Self {
        Self {
            id: SourceId::next(),
            container: RwLock::new(None),
            editing: AtomicBool::new(false),
            affinity: ThreadAffinity::current(),
        }
    }

    /// The source's identity.
    #[inline]
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// The thread this source belongs to.
    #[inline]
    pub fn affinity(&self) -> ThreadAffinity {
        self.affinity
    }

    /// Upgrades the container link.
    pub fn container(&self) -> Option<Arc<dyn DataSourceContainer>> {
        self.container.read().as_ref().and_then(Weak::upgrade)
    }

    /// Returns `true` if a live container is attached.
    pub fn has_container(&self) -> bool {
        self.container().is_some()
    }

    /// Replaces the container link.
    pub fn set_container(&self, container: Option<Weak<dyn DataSourceContainer>>) {
        self.affinity.debug_assert_same_thread();
        *self.container.write() = container;
    }

    /// Whether editing mode is on.
    pub fn is_editing(&self) -> bool {
        self.editing.load(Ordering::Relaxed)
    }

    /// Sets editing mode.
    pub fn set_editing(&self, editing: bool) {
        self.editing.store(editing, Ordering::Relaxed);
    }
}

static_assertions::assert_impl_all!(DataSourceBase: Send, Sync);
static_assertions::assert_obj_safe!(DataSource, DataSourceContainer);
