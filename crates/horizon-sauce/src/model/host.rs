//! The root of a data source tree.
//!
//! A [`CollectionHost`] owns the root data source, acts as its container and
//! talks to the [`CollectionView`]. Actions that reach it are already in
//! global coordinates; the host turns each one into the widget's positional
//! primitives, wrapping batches in a single
//! [`perform_batch_updates`](CollectionView::perform_batch_updates) call.
//!
//! Until [`load_view`](CollectionHost::load_view) is called there is nothing
//! to update, and actions are dropped.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use horizon_sauce_core::logging::targets;
use horizon_sauce_core::{Signal, SourceId, ThreadAffinity};

use super::action::Action;
use super::data_source::{DataSource, DataSourceContainer};
use super::index_path::IndexPath;
use super::view::{CollectionView, ReusableView};

/// Binds a data source tree to a collection view.
pub struct CollectionHost {
    root: Arc<dyn DataSource>,
    view: RwLock<Option<Arc<dyn CollectionView>>>,
    action_performed: Signal<Action>,
    affinity: ThreadAffinity,
}

impl CollectionHost {
    /// Creates a host for `root` and becomes its container.
    pub fn new(root: Arc<dyn DataSource>) -> Arc<Self> {
        let host = Arc::new(Self {
            root,
            view: RwLock::new(None),
            action_performed: Signal::new(),
            affinity: ThreadAffinity::current(),
        });
        let container: Weak<dyn DataSourceContainer> = Arc::downgrade(&host) as Weak<dyn DataSourceContainer>;
        host.root.set_container(Some(container));
        host
    }

    /// The root data source.
    pub fn root(&self) -> &Arc<dyn DataSource> {
        &self.root
    }

    /// Attaches `view` and registers every template the tree uses.
    pub fn load_view(&self, view: Arc<dyn CollectionView>) {
        self.affinity.debug_assert_same_thread();
        *self.view.write() = Some(Arc::clone(&view));
        self.root.register_reusable_views(view.as_ref());
        tracing::debug!(
            target: targets::HOST,
            root = %self.root.id(),
            sections = self.root.number_of_sections(),
            "view loaded"
        );
    }

    /// Detaches the view. Later actions are dropped.
    pub fn unload_view(&self) {
        self.affinity.debug_assert_same_thread();
        *self.view.write() = None;
        tracing::debug!(target: targets::HOST, root = %self.root.id(), "view unloaded");
    }

    /// Returns `true` while a view is attached.
    pub fn is_view_loaded(&self) -> bool {
        self.view.read().is_some()
    }

    /// Emitted with every action applied to the view.
    pub fn action_performed(&self) -> &Signal<Action> {
        &self.action_performed
    }

    /// Number of sections the view should display.
    pub fn number_of_sections(&self) -> usize {
        self.root.number_of_sections()
    }

    /// Number of items the view should display in `section`.
    pub fn number_of_items(&self, section: usize) -> usize {
        self.root.number_of_items(section)
    }

    /// The cell for a global position, or `None` if no view is loaded.
    pub fn cell_for_item(&self, index_path: IndexPath) -> Option<ReusableView> {
        let view = self.collection_view()?;
        Some(self.root.cell_for_item(view.as_ref(), index_path))
    }

    /// A supplementary view for a global position, if the owning source
    /// provides one and a view is loaded.
    pub fn supplementary_view(&self, kind: &str, index_path: IndexPath) -> Option<ReusableView> {
        let view = self.collection_view()?;
        self.root.supplementary_view(view.as_ref(), kind, index_path)
    }

    /// Forwards an interactive move the user already performed in the view.
    pub fn move_item(&self, from: IndexPath, to: IndexPath) {
        self.affinity.debug_assert_same_thread();
        self.root.move_item(from, to);
    }

    fn check_root(&self, child: SourceId) {
        if child != self.root.id() {
            tracing::warn!(
                target: targets::HOST,
                root = %self.root.id(),
                %child,
                "coordinate request from a source that is not the root"
            );
        }
    }
}

impl DataSourceContainer for CollectionHost {
    fn collection_view(&self) -> Option<Arc<dyn CollectionView>> {
        self.view.read().clone()
    }

    fn global_index_path(&self, local: IndexPath, child: SourceId) -> Option<IndexPath> {
        self.check_root(child);
        self.is_view_loaded().then_some(local)
    }

    fn local_index_path(&self, global: IndexPath, child: SourceId) -> Option<IndexPath> {
        self.check_root(child);
        self.is_view_loaded().then_some(global)
    }

    fn data_source_performed(&self, source: SourceId, action: Action) {
        let Some(view) = self.collection_view() else {
            tracing::trace!(
                target: targets::HOST,
                %source,
                ?action,
                "view not loaded, dropping action"
            );
            return;
        };

        tracing::debug!(target: targets::HOST, %source, ?action, "applying action");
        apply(view.as_ref(), &action);
        self.action_performed.emit(action);
    }
}

impl fmt::Debug for CollectionHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionHost")
            .field("root", &self.root.id())
            .field("view_loaded", &self.is_view_loaded())
            .finish()
    }
}

/// Applies `action` to `view`. A batch becomes one transition; batches
/// nested inside it are flattened into the same transition.
fn apply(view: &dyn CollectionView, action: &Action) {
    match action {
        Action::Batch(actions) => {
            view.perform_batch_updates(&mut || {
                for action in actions {
                    apply_primitive(view, action);
                }
            });
        }
        _ => apply_primitive(view, action),
    }
}

fn apply_primitive(view: &dyn CollectionView, action: &Action) {
    match action {
        Action::InsertItems(paths) => view.insert_items(paths),
        Action::DeleteItems(paths) => view.delete_items(paths),
        Action::ReloadItems(paths) => view.reload_items(paths),
        Action::MoveItem { from, to } => view.move_item(*from, *to),
        Action::InsertSections(sections) => view.insert_sections(sections),
        Action::DeleteSections(sections) => view.delete_sections(sections),
        Action::ReloadSections(sections) => view.reload_sections(sections),
        Action::MoveSection { from, to } => view.move_section(*from, *to),
        Action::Batch(actions) => {
            for action in actions {
                apply_primitive(view, action);
            }
        }
    }
}
