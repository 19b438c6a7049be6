//! Path based operations
//!
//! One call per question, each opening and parsing the file afresh. Callers
//! asking several questions of one file should open a
//! [`NitfFile`](crate::model::nitf::NitfFile) once instead.

use std::path::{Path, PathBuf};

use crate::base::Model;
use crate::model::nitf::{
    copy_between_paths, rewrite_header, CopyMode, FileHeader, FileSource, NitfFile, Result,
    SegmentCategory,
};

pub use crate::model::nitf::add_des_bytes;

fn open<P: AsRef<Path>>(path: P) -> Result<NitfFile<FileSource>> {
    NitfFile::<FileSource>::open(path)
}

/// The nine byte version tag, e.g. `NITF02.10`.
pub fn get_version<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(open(path)?.version().to_string())
}

pub fn get_header_length<P: AsRef<Path>>(path: P) -> Result<u32> {
    Ok(open(path)?.header_length())
}

pub fn get_num_images<P: AsRef<Path>>(path: P) -> Result<u16> {
    Ok(open(path)?.count(SegmentCategory::Image))
}

pub fn get_num_graphics<P: AsRef<Path>>(path: P) -> Result<u16> {
    Ok(open(path)?.count(SegmentCategory::Graphic))
}

pub fn get_num_text<P: AsRef<Path>>(path: P) -> Result<u16> {
    Ok(open(path)?.count(SegmentCategory::Text))
}

pub fn get_num_des<P: AsRef<Path>>(path: P) -> Result<u16> {
    Ok(open(path)?.count(SegmentCategory::Des))
}

pub fn get_num_res<P: AsRef<Path>>(path: P) -> Result<u16> {
    Ok(open(path)?.count(SegmentCategory::Reserved))
}

/// DES `index`, sub-header followed by data.
pub fn extract_des<P: AsRef<Path>>(path: P, index: u16) -> Result<Vec<u8>> {
    open(path)?.extract_des(index)
}

/// DES `index` sub-header alone.
pub fn extract_des_header<P: AsRef<Path>>(path: P, index: u16) -> Result<Vec<u8>> {
    open(path)?.extract_des_header(index)
}

/// Write every DES of `input` into `out_dir` as `des_NNN.des`.
pub fn extract_all_des<P: AsRef<Path>, Q: AsRef<Path>>(input: P, out_dir: Q) -> Result<Vec<PathBuf>> {
    open(input)?.extract_all_des(out_dir.as_ref())
}

/// Append every DES of `input` to `output`, rewriting `output` in place.
pub fn copy_des_segments<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<()> {
    copy_des_segments_from_paths(input, output)
}

pub fn copy_des_segments_from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<()> {
    copy(input, output, &[SegmentCategory::Des])
}

pub fn copy_graphic_segments_from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<()> {
    copy(input, output, &[SegmentCategory::Graphic])
}

pub fn copy_text_segments_from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<()> {
    copy(input, output, &[SegmentCategory::Text])
}

/// Graphic, text and DES segments in one rewrite.
pub fn copy_gtd_segments_from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<()> {
    copy(
        input,
        output,
        &[
            SegmentCategory::Graphic,
            SegmentCategory::Text,
            SegmentCategory::Des,
        ],
    )
}

fn copy<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    categories: &[SegmentCategory],
) -> Result<()> {
    copy_between_paths(input.as_ref(), output.as_ref(), categories, CopyMode::Append)?;
    Ok(())
}

/// Write every JPEG 2000 codestream of `input` into `out_dir`.
pub fn extract_all_jp2<P: AsRef<Path>, Q: AsRef<Path>>(input: P, out_dir: Q) -> Result<Vec<PathBuf>> {
    open(input)?.extract_all_jp2(out_dir.as_ref())
}

pub fn extract_jp2_index<P: AsRef<Path>>(input: P, index: u16) -> Result<Vec<u8>> {
    open(input)?.extract_jp2_index(index)
}

/// Rewrite `FTITLE` in place.
pub fn set_file_title<P: AsRef<Path>>(path: P, title: &str) -> Result<FileHeader> {
    rewrite_header(path.as_ref(), |header| header.set_title(title))
}

/// Rewrite `ONAME` in place.
pub fn set_originator_name<P: AsRef<Path>>(path: P, name: &str) -> Result<FileHeader> {
    rewrite_header(path.as_ref(), |header| header.set_originator_name(name))
}

/// Rewrite `FDT` in place, `CCYYMMDDhhmmss`.
pub fn set_file_date_time<P: AsRef<Path>>(path: P, date_time: &str) -> Result<FileHeader> {
    rewrite_header(path.as_ref(), |header| header.set_date_time(date_time))
}

/// Rewrite `OSTAID` in place.
pub fn set_originating_station<P: AsRef<Path>>(path: P, station: &str) -> Result<FileHeader> {
    rewrite_header(path.as_ref(), |header| header.set_originating_station(station))
}
