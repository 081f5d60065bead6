//! Core systems for Horizon Sauce.
//!
//! This crate provides the foundational pieces shared by every data source:
//!
//! - **Identity**: [`SourceId`], the stable handle composites use to tell
//!   their children apart
//! - **Errors**: [`SauceError`], one variant per structural contract
//! - **Signal/Slot System**: direct, single-thread change notification
//! - **Logging**: tracing targets, perf spans and tree formatting options
//! - **Thread checks**: [`thread_check::ThreadAffinity`] for the UI-thread model
//!
//! # Signal Example
//!
//! ```
//! use horizon_sauce_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```

mod error;
mod id;
pub mod logging;
pub mod signal;
pub mod thread_check;

pub use error::{Result, SauceError};
pub use id::SourceId;
pub use logging::{PerfSpan, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use thread_check::ThreadAffinity;
