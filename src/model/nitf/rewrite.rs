//! Rewriting files on disk in place

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{info, instrument};

use crate::base::{Model, SegmentReader};

use super::error::{Error, Result};
use super::header::FileHeader;
use super::{FileSource, NitfFile};

/// Replace the file at `path` with whatever `write` produces.
///
/// The new contents are staged in a temporary file in the same directory and
/// renamed over `path` only once complete, carrying the old file's
/// permissions. If `write` fails the original is untouched.
pub(crate) fn replace_file<T, F>(path: &Path, write: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<T>,
{
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();

    let mut staged = NamedTempFile::new_in(directory)?;
    let value = {
        let mut writer = BufWriter::new(staged.as_file_mut());
        let value = write(&mut writer)?;
        writer.flush()?;
        value
    };
    staged.as_file().set_permissions(permissions)?;
    staged.persist(path).map_err(|error| error.error)?;
    Ok(value)
}

/// Apply `edit` to the header of the file at `path` and write the result back
/// in place. Segment bytes are streamed through unchanged.
///
/// Edits go through the header's `set_*` methods, which keep every field at
/// its width; an edit that changes `HL` or `FL` is refused.
#[instrument(skip(edit), fields(path = %path.display()))]
pub fn rewrite_header<F>(path: &Path, edit: F) -> Result<FileHeader>
where
    F: FnOnce(&mut FileHeader) -> Result<()>,
{
    let file = NitfFile::<FileSource>::open(path)?;
    let mut header = file.header().clone();
    edit(&mut header)?;

    let original = file.header();
    if header.header_length != original.header_length
        || header.file_length != original.file_length
    {
        return Err(Error::malformed(
            "HL",
            0,
            "header edits must keep the header and file lengths",
        ));
    }
    let bytes = header.to_bytes()?;

    let header = replace_file(path, move |sink| {
        sink.write_all(&bytes)?;
        let start = u64::from(file.header_length());
        let mut body = SegmentReader::new(file.source(), start, file.header().file_length - start);
        io::copy(&mut body, sink)?;
        Ok(header)
    })?;
    info!(title = header.title(), "rewrote NITF file header");
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::nitf::{NitfBuilder, NitfVersion, SegmentCategory};
    use tempfile::tempdir;

    fn write_des_file(path: &Path) -> Vec<u8> {
        let bytes = NitfBuilder::version(NitfVersion::Nitf21)
            .unwrap()
            .segment(SegmentCategory::Des, b"DE-header".to_vec(), b"payload".to_vec())
            .build()
            .unwrap();
        fs::write(path, &bytes).unwrap();
        bytes
    }

    #[test]
    fn header_edit_keeps_segments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("edit.ntf");
        let before = write_des_file(&path);

        let header = rewrite_header(&path, |header| {
            header.set_title("renamed.ntf")?;
            header.set_originating_station("STATION")
        })
        .unwrap();
        assert_eq!(header.title(), "renamed.ntf");

        let after = fs::read(&path).unwrap();
        assert_eq!(after.len(), before.len());
        let hl = header.header_length as usize;
        assert_eq!(after[hl..], before[hl..]);
        let reparsed = NitfFile::from_bytes(after).unwrap();
        assert_eq!(reparsed.header().title(), "renamed.ntf");
        assert_eq!(reparsed.header().originating_station(), "STATION");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn failed_edit_leaves_file_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("edit.ntf");
        let before = write_des_file(&path);

        assert!(rewrite_header(&path, |header| header.set_date_time("today")).is_err());
        assert!(rewrite_header(&path, |header| {
            header.file_length += 1;
            Ok(())
        })
        .is_err());
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[cfg(unix)]
    #[test]
    fn replaced_file_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("mode.ntf");
        write_des_file(&path);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        rewrite_header(&path, |header| header.set_title("mode")).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
