//! Assembling new files from raw segments

use std::io::Write;

use crate::base::ByteSource;

use super::error::{Error, Result};
use super::header::{FileHeader, LengthTables, NitfVersion, SegmentCategory, SegmentLengths};
use super::NitfFile;

/// Builds a structurally valid NITF file from a header and raw segments.
///
/// The header supplies everything but the length fields; `FL`, `HL` and the
/// length tables are computed from the segments added.
#[derive(Debug, Clone)]
pub struct NitfBuilder {
    header: FileHeader,
    segments: [Vec<(Vec<u8>, Vec<u8>)>; 6],
}

impl NitfBuilder {
    pub fn new(header: FileHeader) -> Self {
        NitfBuilder {
            header,
            segments: Default::default(),
        }
    }

    /// Start from an empty header of `version`.
    pub fn version(version: NitfVersion) -> Result<Self> {
        Ok(NitfBuilder::new(FileHeader::skeleton(version)?))
    }

    /// Start from an existing file, keeping its header fields and every
    /// segment in order.
    pub fn from_file<S: ByteSource>(file: &NitfFile<S>) -> Result<Self> {
        let mut builder = NitfBuilder::new(file.header().clone());
        for descriptor in file.index() {
            builder.add_segment(
                descriptor.category,
                file.extract_header(descriptor)?,
                file.extract_data(descriptor)?,
            );
        }
        Ok(builder)
    }

    /// Header fields to edit before building. Length fields are recomputed
    /// regardless.
    pub fn header_mut(&mut self) -> &mut FileHeader {
        &mut self.header
    }

    /// Append a segment after any others of its category.
    pub fn add_segment(
        &mut self,
        category: SegmentCategory,
        subheader: impl Into<Vec<u8>>,
        data: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.segments[category.slot()].push((subheader.into(), data.into()));
        self
    }

    pub fn segment(
        mut self,
        category: SegmentCategory,
        subheader: impl Into<Vec<u8>>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.add_segment(category, subheader, data);
        self
    }

    /// The header the built file will carry.
    pub fn header(&self) -> Result<FileHeader> {
        let mut tables = LengthTables::default();
        for category in SegmentCategory::ALL.iter().copied() {
            let (header_field, _) = category.length_fields();
            for (subheader, data) in &self.segments[category.slot()] {
                let header_length =
                    u32::try_from(subheader.len()).map_err(|_| Error::FieldOverflow {
                        field: header_field.to_string(),
                        value: subheader.len() as u64,
                        width: category.length_widths().0,
                    })?;
                tables[category.slot()].push(SegmentLengths {
                    header_length,
                    data_length: data.len() as u64,
                });
            }
        }
        self.header.with_tables(tables)
    }

    /// Write the file to `sink`, returning its header.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> Result<FileHeader> {
        let header = self.header()?;
        sink.write_all(&header.to_bytes()?)?;
        for category in SegmentCategory::ALL.iter().copied() {
            for (subheader, data) in &self.segments[category.slot()] {
                sink.write_all(subheader)?;
                sink.write_all(data)?;
            }
        }
        sink.flush()?;
        Ok(header)
    }

    pub fn build(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }
}

/// Append one DES, sub-header and data, to an in-memory NITF file.
pub fn add_des_bytes(nitf: &[u8], des_header: &[u8], des_data: &[u8]) -> Result<Vec<u8>> {
    let file = NitfFile::parse(nitf)?;
    NitfBuilder::from_file(&file)?
        .segment(SegmentCategory::Des, des_header, des_data)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::nitf::NitfFile;

    #[test]
    fn empty_file_is_skeleton() {
        let bytes = NitfBuilder::version(NitfVersion::Nitf21).unwrap().build().unwrap();
        assert_eq!(bytes.len(), 388);
        let nitf = NitfFile::from_bytes(bytes).unwrap();
        assert!(nitf.index().is_empty());
    }

    #[test]
    fn segments_land_in_category_order() {
        let bytes = NitfBuilder::version(NitfVersion::Nitf21)
            .unwrap()
            .segment(SegmentCategory::Des, b"DE-header".to_vec(), b"des".to_vec())
            .segment(SegmentCategory::Text, b"TE-header".to_vec(), b"text".to_vec())
            .build()
            .unwrap();
        let nitf = NitfFile::from_bytes(bytes).unwrap();
        let text = nitf.descriptor(SegmentCategory::Text, 0).unwrap();
        let des = nitf.descriptor(SegmentCategory::Des, 0).unwrap();
        assert!(text.offset < des.offset);
        assert_eq!(nitf.extract_header(text).unwrap(), b"TE-header");
        assert_eq!(nitf.extract_data(des).unwrap(), b"des");
        assert_eq!(des.end(), nitf.header().file_length);
    }

    #[test]
    fn rejects_unrepresentable_segments() {
        let mut builder = NitfBuilder::version(NitfVersion::Nitf21).unwrap();
        builder.add_segment(SegmentCategory::Label, b"LA".to_vec(), b"label".to_vec());
        assert!(builder.build().is_err());

        let mut builder = NitfBuilder::version(NitfVersion::Nitf21).unwrap();
        builder.add_segment(SegmentCategory::Graphic, b"SY".to_vec(), vec![0u8; 1_000_000]);
        assert!(matches!(
            builder.build(),
            Err(Error::FieldOverflow { width: 6, .. })
        ));
    }

    #[test]
    fn rebuilding_a_file_is_identity() {
        let bytes = NitfBuilder::version(NitfVersion::Nitf21)
            .unwrap()
            .segment(SegmentCategory::Text, b"TE-header".to_vec(), b"text".to_vec())
            .segment(SegmentCategory::Des, b"DE-header".to_vec(), b"des".to_vec())
            .build()
            .unwrap();
        let file = NitfFile::from_bytes(bytes.clone()).unwrap();
        assert_eq!(NitfBuilder::from_file(&file).unwrap().build().unwrap(), bytes);
    }

    #[test]
    fn header_edits_reach_the_built_file() {
        let mut builder = NitfBuilder::version(NitfVersion::Nitf21).unwrap();
        builder.header_mut().set_title("built.ntf").unwrap();
        builder.add_segment(SegmentCategory::Des, b"DE-header".to_vec(), b"des".to_vec());
        let nitf = NitfFile::from_bytes(builder.build().unwrap()).unwrap();
        assert_eq!(nitf.header().title(), "built.ntf");
        assert_eq!(nitf.num_des(), 1);
    }

    #[test]
    fn des_bytes_are_appended() {
        let bytes = NitfBuilder::version(NitfVersion::Nitf21)
            .unwrap()
            .segment(SegmentCategory::Des, b"DE-first".to_vec(), b"one".to_vec())
            .build()
            .unwrap();
        let grown = add_des_bytes(&bytes, b"DE-second", b"two").unwrap();
        assert_eq!(grown.len(), bytes.len() + 13 + b"DE-second".len() + 3);

        let nitf = NitfFile::from_bytes(grown).unwrap();
        assert_eq!(nitf.num_des(), 2);
        let second = nitf.descriptor(SegmentCategory::Des, 1).unwrap();
        assert_eq!(nitf.extract_header(second).unwrap(), b"DE-second");
        assert_eq!(nitf.extract_data(second).unwrap(), b"two");
        assert!(add_des_bytes(b"not a nitf", b"DE", b"").is_err());
    }
}
