//! Prelude module for Horizon Sauce.
//!
//! ```
//! use horizon_sauce::prelude::*;
//! ```
//!
//! This provides access to:
//! - The data source traits (`DataSource`, `DataSourceContainer`, `ArrayProvider`)
//! - The concrete sources (`ArrayDataSource`, `ComposedDataSource`) and `CollectionHost`
//! - Positions and actions (`IndexPath`, `Action`, `CollectionDiff`)
//! - The widget boundary (`CollectionView`, `ReusableView`)

// ============================================================================
// Data Sources
// ============================================================================

pub use crate::model::{
    ArrayDataSource, ArrayProvider, CollectionHost, ComposedDataSource, DataSource,
    DataSourceContainer,
};

// ============================================================================
// Positions and Changes
// ============================================================================

pub use crate::model::{Action, CollectionDiff, IndexPath};

// ============================================================================
// Widget Boundary
// ============================================================================

pub use crate::model::{CollectionView, ItemMetrics, ReusableView, SectionMetrics};

// ============================================================================
// Core
// ============================================================================

pub use crate::{SauceError, Signal, SourceId};
