//! Section mapping between a composite and its children.
//!
//! A [`SectionMapping`] is a snapshot: it records, for each child in order,
//! the first global section it occupies and how many sections it has.
//! Composites cache one and throw it away whenever the children list or a
//! child's section count changes.

use std::ops::Range;
use std::sync::Arc;

use horizon_sauce_core::{Result, SauceError, SourceId};

use super::data_source::DataSource;

/// One child's slot in the global section range.
#[derive(Clone)]
pub struct MappingEntry {
    source: Arc<dyn DataSource>,
    start: usize,
    count: usize,
}

impl MappingEntry {
    /// The child occupying this slot.
    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    /// The global sections this child occupies.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.count
    }
}

impl std::fmt::Debug for MappingEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingEntry")
            .field("source", &self.source.id())
            .field("range", &self.range())
            .finish()
    }
}

/// Child order and section counts, flattened into contiguous ranges.
#[derive(Debug, Clone, Default)]
pub struct SectionMapping {
    entries: Vec<MappingEntry>,
    total: usize,
}

impl SectionMapping {
    /// Builds the mapping by asking every child for its section count.
    pub fn build(children: &[Arc<dyn DataSource>]) -> Self {
        let mut entries = Vec::with_capacity(children.len());
        let mut start = 0;
        for child in children {
            let count = child.number_of_sections();
            entries.push(MappingEntry {
                source: Arc::clone(child),
                start,
                count,
            });
            start += count;
        }

        Self {
            entries,
            total: start,
        }
    }

    /// Total number of global sections.
    pub fn total(&self) -> usize {
        self.total
    }

    /// The slots, in child order.
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Number of children in the mapping.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the mapping has no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a global section to its owning child and local section.
    ///
    /// Children with no sections never own anything.
    pub fn map(&self, section: usize) -> Result<(&Arc<dyn DataSource>, usize)> {
        // Ends are non-decreasing, so the owner is the first slot ending past
        // `section`.
        let position = self
            .entries
            .partition_point(|entry| entry.start + entry.count <= section);

        self.entries
            .get(position)
            .map(|entry| (&entry.source, section - entry.start))
            .ok_or_else(|| SauceError::section_out_of_range(section, self.total))
    }

    /// Translates a child's local section into a global one.
    ///
    /// `section` is not checked against the child's count: a child reporting
    /// an insertion past its cached end still resolves correctly, because a
    /// child's start only depends on the siblings before it.
    pub fn unmap(&self, child: SourceId, section: usize) -> Result<usize> {
        self.entry(child).map(|entry| entry.start + section)
    }

    /// The global sections `child` occupies.
    pub fn section_range(&self, child: SourceId) -> Result<Range<usize>> {
        self.entry(child).map(MappingEntry::range)
    }

    fn entry(&self, child: SourceId) -> Result<&MappingEntry> {
        self.entries
            .iter()
            .find(|entry| entry.source.id() == child)
            .ok_or(SauceError::UnknownChild(child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::data_source::DataSourceBase;
    use crate::model::index_path::IndexPath;
    use crate::model::view::{CollectionView, ReusableView};
    use std::any::Any;

    struct Fixed {
        base: DataSourceBase,
        sections: usize,
    }

    impl DataSource for Fixed {
        fn base(&self) -> &DataSourceBase {
            &self.base
        }
        fn number_of_sections(&self) -> usize {
            self.sections
        }
        fn number_of_items(&self, _section: usize) -> usize {
            0
        }
        fn cell_for_item(&self, view: &dyn CollectionView, index_path: IndexPath) -> ReusableView {
            view.dequeue_reusable_cell("fixed", index_path)
        }
        fn register_reusable_views(&self, _view: &dyn CollectionView) {}
        fn item_at(&self, _index_path: IndexPath) -> Option<Arc<dyn Any + Send + Sync>> {
            None
        }
    }

    fn fixed(sections: usize) -> Arc<dyn DataSource> {
        Arc::new(Fixed {
            base: DataSourceBase::new(),
            sections,
        })
    }

    #[test]
    fn test_ranges_are_contiguous() {
        let children = vec![fixed(2), fixed(0), fixed(3)];
        let mapping = SectionMapping::build(&children);

        assert_eq!(mapping.total(), 5);
        assert_eq!(mapping.section_range(children[0].id()), Ok(0..2));
        assert_eq!(mapping.section_range(children[1].id()), Ok(2..2));
        assert_eq!(mapping.section_range(children[2].id()), Ok(2..5));
    }

    #[test]
    fn test_map_skips_empty_children() {
        let children = vec![fixed(2), fixed(0), fixed(3)];
        let mapping = SectionMapping::build(&children);

        let (owner, local) = mapping.map(2).unwrap();
        assert_eq!(owner.id(), children[2].id());
        assert_eq!(local, 0);

        let (owner, local) = mapping.map(1).unwrap();
        assert_eq!(owner.id(), children[0].id());
        assert_eq!(local, 1);

        assert_eq!(
            mapping.map(5).map(|(_, local)| local),
            Err(SauceError::section_out_of_range(5, 5))
        );
    }

    #[test]
    fn test_map_unmap_inverse() {
        let children = vec![fixed(1), fixed(4), fixed(2)];
        let mapping = SectionMapping::build(&children);

        for child in &children {
            for local in 0..child.number_of_sections() {
                let global = mapping.unmap(child.id(), local).unwrap();
                let (owner, back) = mapping.map(global).unwrap();
                assert_eq!(owner.id(), child.id());
                assert_eq!(back, local);
            }
        }
    }

    #[test]
    fn test_unknown_child() {
        let mapping = SectionMapping::build(&[fixed(1)]);
        let stranger = fixed(1);
        assert_eq!(
            mapping.unmap(stranger.id(), 0),
            Err(SauceError::UnknownChild(stranger.id()))
        );
    }

    #[test]
    fn test_empty_mapping() {
        let mapping = SectionMapping::build(&[]);
        assert!(mapping.is_empty());
        assert_eq!(mapping.total(), 0);
        assert!(mapping.map(0).is_err());
    }
}
