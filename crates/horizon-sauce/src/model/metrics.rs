//! Layout hints a data source hands to the layout engine.
//!
//! Computing layout is the widget's job; sources only describe per-section
//! spacing and per-item sizes, routed through composites like any other
//! positional query.

/// Spacing around the content of a section.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets {
    /// Space above the content.
    pub top: f32,
    /// Space before the content.
    pub left: f32,
    /// Space below the content.
    pub bottom: f32,
    /// Space after the content.
    pub right: f32,
}

impl EdgeInsets {
    /// Creates insets with explicit values for every edge.
    pub const fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Creates insets with the same value on every edge.
    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }
}

/// Layout hints for one section.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SectionMetrics {
    /// Padding around the section's items.
    pub insets: EdgeInsets,
    /// Spacing between items on the same line.
    pub item_spacing: f32,
    /// Spacing between lines of items.
    pub line_spacing: f32,
    /// Height of the section header, `0.0` for none.
    pub header_height: f32,
    /// Height of the section footer, `0.0` for none.
    pub footer_height: f32,
}

impl SectionMetrics {
    /// Sets the insets.
    pub fn with_insets(mut self, insets: EdgeInsets) -> Self {
        self.insets = insets;
        self
    }

    /// Sets the item and line spacing.
    pub fn with_spacing(mut self, item_spacing: f32, line_spacing: f32) -> Self {
        self.item_spacing = item_spacing;
        self.line_spacing = line_spacing;
        self
    }

    /// Sets the header height.
    pub fn with_header(mut self, height: f32) -> Self {
        self.header_height = height;
        self
    }

    /// Sets the footer height.
    pub fn with_footer(mut self, height: f32) -> Self {
        self.footer_height = height;
        self
    }
}

/// Layout hints for one item.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ItemMetrics {
    /// Preferred width, `0.0` to let the layout decide.
    pub width: f32,
    /// Preferred height, `0.0` to let the layout decide.
    pub height: f32,
}

impl ItemMetrics {
    /// Creates metrics for an item of the given size.
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}
