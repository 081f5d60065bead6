//! Composable data sources for sectioned collection views.
//!
//! A collection view displays one flat list of sections. This module lets
//! that list be assembled from independent pieces and keeps the view updated
//! with fine-grained changes instead of full reloads.
//!
//! # Core Types
//!
//! - `IndexPath`: a `(section, item)` position
//! - `Action`: a positional mutation, or a batch of them
//! - `CollectionDiff`: turns two orderings into deletions, insertions and moves
//! - `DataSource`: the trait every node of the tree implements
//! - `DataSourceContainer`: what a child may ask of its parent
//! - `CollectionView`: the rendering widget boundary
//!
//! # Data Source Implementations
//!
//! - `ArrayDataSource`: one section backed by a diffed list of unique items
//! - `ComposedDataSource`: children's sections laid out back to back
//! - `CollectionHost`: the root container that applies actions to the view
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌────────────────┐   primitives   ┌────────────────┐
//!                 │ CollectionHost │───────────────>│ CollectionView │
//!                 └────────────────┘                └────────────────┘
//!                    owns │  ^ Action (global)
//!                         v  │
//!               ┌────────────────────┐
//!               │ ComposedDataSource │  re-addresses sections
//!               └────────────────────┘
//!                owns │   ^ Action (local)
//!                     v   │
//!                ┌─────────────────┐
//!                │ ArrayDataSource │  diffs item lists
//!                └─────────────────┘
//! ```
//!
//! Ownership flows down through `Arc`s; actions flow up through weak
//! container references.

mod action;
mod array_source;
mod composed_source;
mod data_source;
mod debug;
mod diff;
mod host;
mod index_path;
mod mapping;
mod metrics;
mod view;

pub use action::Action;
pub use array_source::{ArrayDataSource, ArrayProvider};
pub use composed_source::{ComposedDataSource, ComposedDataSourceBuilder};
pub use data_source::{DataSource, DataSourceBase, DataSourceContainer};
pub use debug::SourceTreeDebug;
pub use diff::CollectionDiff;
pub use host::CollectionHost;
pub use index_path::IndexPath;
pub use mapping::{MappingEntry, SectionMapping};
pub use metrics::{EdgeInsets, ItemMetrics, SectionMetrics};
pub use view::{CollectionView, ReusableView};
