//! JPEG 2000 codestreams carried in image segments

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::base::ByteSource;

use super::cursor::FieldReader;
use super::error::{Error, Result};
use super::header::SegmentCategory;
use super::NitfFile;

/// JPEG 2000 signature box, always the first box of a JP2 file.
const SIGNATURE_BOX: [u8; 12] = [
    0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A, 0x87, 0x0A,
];
/// Start of codestream marker.
const SOC: [u8; 2] = [0xFF, 0x4F];
/// Width of IMDATOFF, the first field of a masked image's mask table.
const IMDATOFF_WIDTH: u64 = 4;

const BOX_HEADER: u64 = 8;
const EXTENDED_BOX_HEADER: u64 = 16;

/// How the codestream is wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jp2Format {
    /// JP2 file format, a chain of boxes opening with the signature box.
    Boxed,
    /// Raw codestream opening with the SOC marker.
    Codestream,
}

impl Jp2Format {
    pub fn extension(self) -> &'static str {
        match self {
            Jp2Format::Boxed => "jp2",
            Jp2Format::Codestream => "j2k",
        }
    }
}

/// Absolute position of an image segment's codestream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jp2Location {
    pub image_index: u16,
    pub offset: u64,
    pub length: u64,
    pub format: Jp2Format,
}

impl Jp2Location {
    /// `image_NNN.jp2` or `image_NNN.j2k`.
    pub fn file_name(&self) -> String {
        format!("image_{:03}.{}", self.image_index, self.format.extension())
    }
}

impl<S: ByteSource> NitfFile<S> {
    /// Find the codestream of image segment `index`.
    pub fn locate_jp2(&self, index: u16) -> Result<Jp2Location> {
        let descriptor = *self.descriptor(SegmentCategory::Image, index)?;
        let subheader = self.image_subheader(index)?;
        if !subheader.is_jpeg2000() {
            return Err(Error::NotJp2Compressed {
                index,
                compression: subheader.compression,
            });
        }

        let end = descriptor.end();
        let mut start = descriptor.data_offset();
        if subheader.is_masked() {
            let imdatoff = self.read_range(start, IMDATOFF_WIDTH)?;
            let skip = u32::from_be_bytes([imdatoff[0], imdatoff[1], imdatoff[2], imdatoff[3]]);
            start = start
                .checked_add(u64::from(skip))
                .filter(|start| *start <= end)
                .ok_or(Error::InvalidCodestream {
                    index,
                    offset: start,
                })?;
        }

        let available = end - start;
        let head = self.read_range(start, available.min(SIGNATURE_BOX.len() as u64))?;
        let (format, length) = if head[..] == SIGNATURE_BOX[..] {
            let length = match boxed_extent(self.source(), start, end)? {
                Some(length) => length,
                None => {
                    debug!(index, "malformed JP2 box chain, taking the whole data block");
                    available
                }
            };
            (Jp2Format::Boxed, length)
        } else if head.starts_with(&SOC) {
            (Jp2Format::Codestream, available)
        } else {
            return Err(Error::InvalidCodestream {
                index,
                offset: start,
            });
        };

        Ok(Jp2Location {
            image_index: index,
            offset: start,
            length,
            format,
        })
    }

    /// Locate every image's codestream, one result per image in file order.
    pub fn scan_jp2(&self) -> Vec<Result<Jp2Location>> {
        (0..self.num_images())
            .into_par_iter()
            .map(|index| self.locate_jp2(index))
            .collect()
    }

    /// Codestreams of every JPEG 2000 image. Images that are not JPEG 2000 or
    /// fail to locate are logged and skipped.
    pub fn locate_all_jp2(&self) -> Vec<Jp2Location> {
        self.scan_jp2()
            .into_iter()
            .enumerate()
            .filter_map(|(index, result)| match result {
                Ok(location) => Some(location),
                Err(error @ Error::NotJp2Compressed { .. }) => {
                    info!(index, %error, "skipping image");
                    None
                }
                Err(error) => {
                    warn!(index, %error, "skipping image");
                    None
                }
            })
            .collect()
    }

    /// Bytes of image `index`'s codestream.
    pub fn extract_jp2_index(&self, index: u16) -> Result<Vec<u8>> {
        let location = self.locate_jp2(index)?;
        self.read_range(location.offset, location.length)
    }

    /// Write every JPEG 2000 codestream to `out_dir` as `image_NNN.jp2` or
    /// `image_NNN.j2k`, returning the paths written. An image whose
    /// codestream cannot be written is logged and skipped; only failing to
    /// create `out_dir` aborts.
    #[instrument(skip_all, fields(out_dir = %out_dir.display()))]
    pub fn extract_all_jp2(&self, out_dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(out_dir)?;
        let mut written = Vec::new();
        for location in self.locate_all_jp2() {
            let path = out_dir.join(location.file_name());
            match self.write_range(&path, location.offset, location.length) {
                Ok(()) => written.push(path),
                Err(error) => warn!(index = location.image_index, %error, "skipping image"),
            }
        }
        info!(count = written.len(), "extracted JPEG 2000 codestreams");
        Ok(written)
    }
}

/// Length of the top-level box chain starting at `start`.
///
/// Returns `None` when a box header is invalid or a box overruns `end`.
/// Fewer than eight trailing bytes are not part of the chain.
fn boxed_extent<S: ByteSource + ?Sized>(source: &S, start: u64, end: u64) -> Result<Option<u64>> {
    let mut position = start;
    while end - position >= BOX_HEADER {
        let header = FieldReader::at(source, position).read_fixed(BOX_HEADER as usize)?;
        let lbox = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        let length = match lbox {
            // Last box, runs to the end.
            0 => return Ok(Some(end - start)),
            1 => {
                if end - position < EXTENDED_BOX_HEADER {
                    return Ok(None);
                }
                let xlbox = FieldReader::at(source, position + BOX_HEADER).read_fixed(8)?;
                let mut be = [0u8; 8];
                be.copy_from_slice(&xlbox);
                let length = u64::from_be_bytes(be);
                if length < EXTENDED_BOX_HEADER {
                    return Ok(None);
                }
                length
            }
            2..=7 => return Ok(None),
            length => u64::from(length),
        };
        if length > end - position {
            return Ok(None);
        }
        position += length;
    }
    Ok(Some(position - start))
}
