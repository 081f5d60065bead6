//! The boundary with the rendering widget.
//!
//! Horizon Sauce does not draw anything. A [`CollectionView`] is whatever
//! widget displays the flattened list: it keeps templates registered by the
//! sources, hands out reusable views for positions, and applies the
//! positional primitives the root host translates every [`Action`] into.
//!
//! [`Action`]: super::Action

use super::index_path::IndexPath;

/// A view handed out by the widget for one position, ready to be filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReusableView {
    /// The template the view was created from.
    pub reuse_identifier: String,
    /// The position the view was dequeued for.
    pub index_path: IndexPath,
    /// Text content set by the data source.
    pub content: Option<String>,
}

impl ReusableView {
    /// Creates an empty view for `index_path` from the given template.
    pub fn new(reuse_identifier: impl Into<String>, index_path: IndexPath) -> Self {
        Self {
            reuse_identifier: reuse_identifier.into(),
            index_path,
            content: None,
        }
    }

    /// Sets the view's text content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// The rendering widget a data source tree feeds.
///
/// Every method is called on the UI thread. The positional primitives
/// receive indices in the root's global coordinate space.
pub trait CollectionView: Send + Sync {
    /// Registers a cell template under `reuse_identifier`.
    fn register_cell(&self, reuse_identifier: &str);

    /// Registers a supplementary view template (header, footer, ...) of `kind`.
    fn register_supplementary_view(&self, kind: &str, reuse_identifier: &str);

    /// Returns a cell created from a registered template.
    fn dequeue_reusable_cell(&self, reuse_identifier: &str, index_path: IndexPath) -> ReusableView {
        ReusableView::new(reuse_identifier, index_path)
    }

    /// Returns a supplementary view created from a registered template.
    fn dequeue_supplementary_view(
        &self,
        _kind: &str,
        reuse_identifier: &str,
        index_path: IndexPath,
    ) -> ReusableView {
        ReusableView::new(reuse_identifier, index_path)
    }

    /// Inserts items at their final positions.
    fn insert_items(&self, index_paths: &[IndexPath]);
    /// Deletes items at their positions before the update.
    fn delete_items(&self, index_paths: &[IndexPath]);
    /// Redisplays items in place.
    fn reload_items(&self, index_paths: &[IndexPath]);
    /// Moves one item from its old position to its final position.
    fn move_item(&self, from: IndexPath, to: IndexPath);

    /// Inserts sections at their final indices.
    fn insert_sections(&self, sections: &[usize]);
    /// Deletes sections at their indices before the update.
    fn delete_sections(&self, sections: &[usize]);
    /// Redisplays sections in place.
    fn reload_sections(&self, sections: &[usize]);
    /// Moves one section from its old index to its final index.
    fn move_section(&self, from: usize, to: usize);

    /// Runs `updates` as one animated transition.
    ///
    /// Every primitive called from inside `updates` belongs to the same
    /// transition; nothing may be rendered between them.
    fn perform_batch_updates(&self, updates: &mut dyn FnMut());
}
