//! Horizon Sauce - composable, diff-driven data sources for collection views.
//!
//! This is the main umbrella crate that re-exports the core crate and adds
//! the data source model.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_sauce::prelude::*;
//!
//! struct Colors(Vec<&'static str>);
//!
//! impl ArrayProvider for Colors {
//!     type Item = &'static str;
//!
//!     fn load_initial_items(&self) -> Vec<&'static str> {
//!         self.0.clone()
//!     }
//!
//!     fn register_reusable_views(&self, view: &dyn CollectionView) {
//!         view.register_cell("color");
//!     }
//!
//!     fn cell_for_item(
//!         &self,
//!         view: &dyn CollectionView,
//!         item: &&'static str,
//!         index_path: IndexPath,
//!     ) -> ReusableView {
//!         view.dequeue_reusable_cell("color", index_path).with_content(*item)
//!     }
//! }
//!
//! let warm = ArrayDataSource::new_shared(Colors(vec!["red", "orange"]));
//! let cold = ArrayDataSource::new_shared(Colors(vec!["blue"]));
//! let root = ComposedDataSource::builder().child(warm.clone()).build();
//! let host = CollectionHost::new(root.clone());
//!
//! root.add(cold.clone(), None);
//! assert_eq!(host.number_of_sections(), 2);
//!
//! warm.update_items(vec!["orange", "yellow"]);
//! assert_eq!(root.number_of_items(0), 2);
//! ```

pub use horizon_sauce_core::*;

pub mod model;
pub mod prelude;
