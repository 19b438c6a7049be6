//! Segment offsets derived from the file header

use std::ops::Range;

use super::error::{Error, Inconsistency, Result};
use super::header::{FileHeader, SegmentCategory};

/// Location of one segment within the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentDescriptor {
    pub category: SegmentCategory,
    /// Zero-based position within the category.
    pub index: u16,
    /// Absolute offset of the sub-header.
    pub offset: u64,
    pub header_length: u32,
    pub data_length: u64,
}

impl SegmentDescriptor {
    /// Absolute offset of the data block.
    pub fn data_offset(&self) -> u64 {
        self.offset + u64::from(self.header_length)
    }

    /// Absolute offset one past the data block.
    pub fn end(&self) -> u64 {
        self.data_offset() + self.data_length
    }
}

/// Every segment of a file in file order, grouped by category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentIndex {
    descriptors: Vec<SegmentDescriptor>,
    groups: [Range<usize>; 6],
    end: u64,
}

impl SegmentIndex {
    /// Walk the header's length tables, failing if the segments do not end
    /// exactly at `FL`.
    pub fn build(header: &FileHeader) -> Result<SegmentIndex> {
        let index = SegmentIndex::accumulate(header)?;
        if let Some(inconsistency) = index.inconsistency(header) {
            return Err(Error::StructuralInconsistency(inconsistency));
        }
        Ok(index)
    }

    /// Walk the header's length tables without checking the end offset.
    pub fn accumulate(header: &FileHeader) -> Result<SegmentIndex> {
        let mut descriptors = Vec::new();
        let mut groups: [Range<usize>; 6] = Default::default();
        let mut offset = u64::from(header.header_length);

        for category in SegmentCategory::ALL.iter().copied() {
            let first = descriptors.len();
            for (index, lengths) in header.lengths(category).iter().enumerate() {
                descriptors.push(SegmentDescriptor {
                    category,
                    index: index as u16,
                    offset,
                    header_length: lengths.header_length,
                    data_length: lengths.data_length,
                });
                offset = offset.checked_add(lengths.total()).ok_or_else(|| {
                    Error::malformed(
                        category.length_fields().1,
                        offset,
                        format!("{} segment {} overflows the file offset", category, index),
                    )
                })?;
            }
            groups[category.slot()] = first..descriptors.len();
        }

        Ok(SegmentIndex {
            descriptors,
            groups,
            end: offset,
        })
    }

    /// Disagreement between the walked end offset and the header's `FL`.
    pub fn inconsistency(&self, header: &FileHeader) -> Option<Inconsistency> {
        if self.end == header.file_length {
            None
        } else {
            Some(Inconsistency {
                what: "FL",
                declared: header.file_length,
                computed: self.end,
            })
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SegmentDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn count(&self, category: SegmentCategory) -> u16 {
        self.groups[category.slot()].len() as u16
    }

    pub fn list(&self, category: SegmentCategory) -> &[SegmentDescriptor] {
        &self.descriptors[self.groups[category.slot()].clone()]
    }

    pub fn get(&self, category: SegmentCategory, index: u16) -> Result<&SegmentDescriptor> {
        self.list(category)
            .get(usize::from(index))
            .ok_or(Error::IndexOutOfRange {
                category,
                index,
                count: self.count(category),
            })
    }

    /// Bytes covered by every segment of `category`, sub-headers included.
    ///
    /// Empty categories yield an empty range at the point where their
    /// segments would start.
    pub fn category_span(&self, category: SegmentCategory) -> Range<u64> {
        let group = &self.groups[category.slot()];
        match (self.descriptors.get(group.start), group.is_empty()) {
            (Some(first), false) => first.offset..self.descriptors[group.end - 1].end(),
            _ => {
                let start = self.descriptors[..group.start]
                    .last()
                    .map_or(self.start(), SegmentDescriptor::end);
                start..start
            }
        }
    }

    /// Offset one past the last segment.
    pub fn end(&self) -> u64 {
        self.end
    }

    fn start(&self) -> u64 {
        self.descriptors.first().map_or(self.end, |first| first.offset)
    }
}

/// Strictly derive the segment index of `header`.
pub fn build_index(header: &FileHeader) -> Result<SegmentIndex> {
    SegmentIndex::build(header)
}

impl<'a> IntoIterator for &'a SegmentIndex {
    type Item = &'a SegmentDescriptor;
    type IntoIter = std::slice::Iter<'a, SegmentDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
