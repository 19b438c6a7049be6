//! Copying whole segment categories between files

use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::base::{ByteSource, Model, SegmentReader};

use super::error::{Error, Result};
use super::header::{FileHeader, SegmentCategory};
use super::rewrite::replace_file;
use super::{FileSource, NitfFile};

/// What happens to the target's own segments of a copied category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyMode {
    /// Keep the target's segments and add the source's after them.
    #[default]
    Append,
    /// Drop the target's segments in favour of the source's.
    Replace,
}

/// Write `target` with the segments of `categories` copied in from `source`.
///
/// Returns the header written to `sink`. Segment bytes are streamed; neither
/// file is modified.
pub fn copy_categories<S, T, W>(
    source: &NitfFile<S>,
    target: &NitfFile<T>,
    categories: &[SegmentCategory],
    mode: CopyMode,
    sink: &mut W,
) -> Result<FileHeader>
where
    S: ByteSource,
    T: ByteSource,
    W: Write,
{
    if let Some(inconsistency) = target.inconsistency() {
        return Err(Error::incompatible(
            "target is structurally inconsistent",
            Some(Error::StructuralInconsistency(inconsistency)),
        ));
    }
    let source_version = source.header().version();
    let target_version = target.header().version();
    if !target_version.is_layout_compatible(source_version) {
        return Err(Error::incompatible(
            format!(
                "cannot copy {} segments into a {} file",
                source_version, target_version
            ),
            None,
        ));
    }

    let selected = |category: SegmentCategory| categories.contains(&category);

    let mut tables = target.header().tables().clone();
    for category in SegmentCategory::ALL.iter().copied().filter(|c| selected(*c)) {
        let table = &mut tables[category.slot()];
        if mode == CopyMode::Replace {
            table.clear();
        }
        table.extend_from_slice(source.header().lengths(category));
    }
    let header = target.header().with_tables(tables)?;

    sink.write_all(&header.to_bytes()?)?;
    for category in SegmentCategory::ALL.iter().copied() {
        if !selected(category) || mode == CopyMode::Append {
            let copied = stream_category(target, category, sink)?;
            debug!(%category, bytes = copied, "kept target segments");
        }
        if selected(category) {
            let copied = stream_category(source, category, sink)?;
            debug!(%category, bytes = copied, "copied source segments");
        }
    }
    sink.flush()?;

    info!(
        ?categories,
        ?mode,
        file_length = header.file_length,
        "rewrote NITF file"
    );
    Ok(header)
}

/// Copy `categories` from the file at `source_path` into the file at
/// `target_path`, replacing the target once the new file is complete. The
/// target keeps its permissions.
#[instrument(skip(categories), fields(source = %source_path.display(), target = %target_path.display()))]
pub fn copy_between_paths(
    source_path: &Path,
    target_path: &Path,
    categories: &[SegmentCategory],
    mode: CopyMode,
) -> Result<FileHeader> {
    let source = NitfFile::<FileSource>::open(source_path)?;
    let target = NitfFile::<FileSource>::open(target_path)
        .map_err(|error| Error::incompatible("target is not a readable NITF file", Some(error)))?;

    // The closure owns `target`, so its handle on the old file is released
    // before the staged file replaces it.
    replace_file(target_path, move |sink| {
        copy_categories(&source, &target, categories, mode, sink)
    })
}

fn stream_category<S: ByteSource, W: Write>(
    file: &NitfFile<S>,
    category: SegmentCategory,
    sink: &mut W,
) -> Result<u64> {
    let span = file.index().category_span(category);
    let mut reader = SegmentReader::new(file.source(), span.start, span.end - span.start);
    Ok(io::copy(&mut reader, sink)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::nitf::{NitfBuilder, NitfVersion, ParseOptions};

    fn des(id: &str) -> Vec<u8> {
        let mut bytes = b"DE".to_vec();
        bytes.extend_from_slice(format!("{:<25}", id).as_bytes());
        bytes.extend_from_slice(b"01U");
        bytes
    }

    fn file_with_des(version: NitfVersion, ids: &[&str]) -> Vec<u8> {
        let mut builder = NitfBuilder::version(version).unwrap();
        for id in ids {
            builder.add_segment(SegmentCategory::Des, des(id), id.as_bytes().to_vec());
        }
        builder.build().unwrap()
    }

    #[test]
    fn append_adds_after_target_segments() {
        let source = NitfFile::from_bytes(file_with_des(NitfVersion::Nitf21, &["S1", "S2"])).unwrap();
        let target = NitfFile::from_bytes(file_with_des(NitfVersion::Nitf21, &["T1"])).unwrap();

        let mut out = Vec::new();
        let header = copy_categories(
            &source,
            &target,
            &[SegmentCategory::Des],
            CopyMode::Append,
            &mut out,
        )
        .unwrap();
        assert_eq!(header.file_length, out.len() as u64);

        let copied = NitfFile::from_bytes(out).unwrap();
        assert_eq!(copied.num_des(), 3);
        let data: Vec<_> = copied
            .list(SegmentCategory::Des)
            .iter()
            .map(|d| copied.extract_data(d).unwrap())
            .collect();
        assert_eq!(data, vec![b"T1".to_vec(), b"S1".to_vec(), b"S2".to_vec()]);
    }

    #[test]
    fn replace_drops_target_segments() {
        let source = NitfFile::from_bytes(file_with_des(NitfVersion::Nitf21, &["S1"])).unwrap();
        let target = NitfFile::from_bytes(file_with_des(NitfVersion::Nitf21, &["T1", "T2"])).unwrap();

        let mut out = Vec::new();
        copy_categories(
            &source,
            &target,
            &[SegmentCategory::Des],
            CopyMode::Replace,
            &mut out,
        )
        .unwrap();
        let copied = NitfFile::from_bytes(out).unwrap();
        assert_eq!(copied.num_des(), 1);
        let only = copied.descriptor(SegmentCategory::Des, 0).unwrap();
        assert_eq!(copied.extract_data(only).unwrap(), b"S1");
    }

    #[test]
    fn version_mismatch_is_incompatible() {
        let source = NitfFile::from_bytes(file_with_des(NitfVersion::Nitf20, &["S1"])).unwrap();
        let target = NitfFile::from_bytes(file_with_des(NitfVersion::Nitf21, &[])).unwrap();
        let mut out = Vec::new();
        assert!(matches!(
            copy_categories(&source, &target, &[SegmentCategory::Des], CopyMode::Append, &mut out),
            Err(Error::IncompatibleTarget { .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn nsif_and_nitf21_are_interchangeable() {
        let source = NitfFile::from_bytes(file_with_des(NitfVersion::Nsif10, &["S1"])).unwrap();
        let target = NitfFile::from_bytes(file_with_des(NitfVersion::Nitf21, &[])).unwrap();
        let mut out = Vec::new();
        copy_categories(&source, &target, &[SegmentCategory::Des], CopyMode::Append, &mut out).unwrap();
        let copied = NitfFile::from_bytes(out).unwrap();
        assert_eq!(copied.version(), "NITF02.10");
        assert_eq!(copied.num_des(), 1);
    }

    #[test]
    fn inconsistent_target_is_incompatible() {
        let source = NitfFile::from_bytes(file_with_des(NitfVersion::Nitf21, &["S1"])).unwrap();
        let mut bytes = file_with_des(NitfVersion::Nitf21, &["T1"]);
        bytes.extend_from_slice(b"junk");
        let target = NitfFile::parse_with(bytes, ParseOptions::lenient()).unwrap();
        assert!(target.inconsistency().is_some());

        let mut out = Vec::new();
        match copy_categories(&source, &target, &[SegmentCategory::Des], CopyMode::Append, &mut out) {
            Err(Error::IncompatibleTarget { source: Some(cause), .. }) => {
                assert!(matches!(*cause, Error::StructuralInconsistency(_)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn count_overflow_is_reported() {
        let ids: Vec<String> = (0..600).map(|n| format!("D{}", n)).collect();
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
        let file = NitfFile::from_bytes(file_with_des(NitfVersion::Nitf21, &ids)).unwrap();

        let mut out = Vec::new();
        assert!(matches!(
            copy_categories(&file, &file, &[SegmentCategory::Des], CopyMode::Append, &mut out),
            Err(Error::FieldOverflow { width: 3, .. })
        ));
    }
}
