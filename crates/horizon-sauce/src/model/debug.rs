//! Debug rendering of data source trees.
//!
//! ```
//! use horizon_sauce::model::{ComposedDataSource, SourceTreeDebug};
//! use horizon_sauce::TreeFormatOptions;
//!
//! let root = ComposedDataSource::new();
//! let text = SourceTreeDebug::with_options(TreeFormatOptions::minimal()).format(&*root);
//! assert_eq!(text, "ComposedDataSource\n");
//! ```

use horizon_sauce_core::TreeFormatOptions;

use super::data_source::DataSource;

/// Formats a data source tree with each node's global section range.
#[derive(Debug, Clone, Default)]
pub struct SourceTreeDebug {
    options: TreeFormatOptions,
}

impl SourceTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the tree rooted at `root`, one node per line.
    pub fn format(&self, root: &dyn DataSource) -> String {
        let mut output = String::new();
        self.format_into(root, 0, 0, true, &mut output);
        output
    }

    fn format_into(
        &self,
        source: &dyn DataSource,
        start: usize,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        let sections = source.number_of_sections();
        output.push_str(&self.options.prefix(depth, is_last));
        output.push_str(short_type_name(source.type_name()));

        if self.options.show_ids {
            output.push_str(&format!(" {}", source.id()));
        }
        if self.options.show_sections {
            let items: usize = (0..sections).map(|s| source.number_of_items(s)).sum();
            output.push_str(&format!(
                " sections {}..{} ({items} items)",
                start,
                start + sections
            ));
        }
        if source.is_editing() {
            output.push_str(" (editing)");
        }
        output.push('\n');

        let children = source.children();
        let count = children.len();
        let mut child_start = start;
        for (i, child) in children.iter().enumerate() {
            self.format_into(child.as_ref(), child_start, depth + 1, i + 1 == count, output);
            child_start += child.number_of_sections();
        }
    }
}

/// Strips the module path and generic arguments.
fn short_type_name(name: &str) -> &str {
    let name = name.split('<').next().unwrap_or(name);
    name.rsplit("::").next().unwrap_or(name)
}
