//! Logging and debugging facilities for Horizon Sauce.
//!
//! This module provides:
//! - Integration with the `tracing` crate for structured logging
//! - Target names for filtering each subsystem
//! - Formatting options shared by the tree debug printers
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Horizon Sauce uses the `tracing` crate for instrumentation. To see logs,
//! you need to install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_sauce::compose=debug")
//!         .init();
//! }
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_sauce_core";
    /// Signal dispatch target.
    pub const SIGNAL: &str = "horizon_sauce_core::signal";
    /// Diff engine target.
    pub const DIFF: &str = "horizon_sauce::diff";
    /// Composite data source target (mapping, relaying, child changes).
    pub const COMPOSE: &str = "horizon_sauce::compose";
    /// Array-backed leaf data source target.
    pub const ARRAY: &str = "horizon_sauce::array";
    /// Root host target (actions applied to the widget).
    pub const HOST: &str = "horizon_sauce::host";
    /// Performance spans target.
    pub const PERF: &str = "horizon_sauce::perf";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

impl TreeStyle {
    /// Returns the `(branch, tee, corner)` glyphs for this style.
    pub fn glyphs(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::Ascii => ("|", "+--", "`--"),
            Self::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            Self::Compact => ("", "-", "-"),
        }
    }
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show source IDs.
    pub show_ids: bool,
    /// Whether to show type names.
    pub show_types: bool,
    /// Whether to show section ranges and item counts.
    pub show_sections: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_types: true,
            show_sections: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_types: false,
            show_sections: false,
            ..Default::default()
        }
    }

    /// Build the prefix string for a tree node at `depth`.
    pub fn prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, corner) = self.style.glyphs();
        let mut prefix = String::new();

        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            for _ in 0..self.indent_size {
                prefix.push(' ');
            }
        }

        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// These are just wrappers around the `tracing` crate macros with
/// consistent target naming.
#[macro_export]
macro_rules! sauce_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[macro_export]
macro_rules! sauce_error {
    ($($arg:tt)*) => {
        tracing::error!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}
