//! NITF related module

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::base::{ByteSource, Model, ReaderSource, SegmentReader};

mod builder;
mod copy;
mod cursor;
mod error;
mod header;
mod index;
mod jp2;
mod rewrite;
mod subheader;

pub use builder::{add_des_bytes, NitfBuilder};
pub use copy::{copy_categories, copy_between_paths, CopyMode};
pub use cursor::{format_ascii_int, parse_ascii_int, FieldReader};
pub use error::{Error, Inconsistency, Result};
pub use header::{
    parse_header, parse_tres, FileHeader, LengthTables, NitfVersion, SegmentCategory,
    SegmentLengths, Tre, MAX_SEGMENTS,
};
pub use index::{build_index, SegmentDescriptor, SegmentIndex};
pub use jp2::{Jp2Format, Jp2Location};
pub use rewrite::rewrite_header;
pub use subheader::{ImageSubheader, SegmentSubheader, Subheader};

/// Byte source used when a model is opened from a path.
///
/// Every read seeks first, so the file is wrapped unbuffered.
pub type FileSource = ReaderSource<File>;

/// How strictly header arithmetic is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Fail on a structural inconsistency instead of recording it.
    pub strict: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions { strict: true }
    }
}

impl ParseOptions {
    pub fn lenient() -> Self {
        ParseOptions { strict: false }
    }
}

/// NITF (National Imagery Transmission Format) model
///
/// Built once from a byte source; every query afterwards reads through the
/// cached header and segment index.
pub struct NitfFile<S = Vec<u8>> {
    source: S,
    header: FileHeader,
    index: SegmentIndex,
    inconsistency: Option<Inconsistency>,
}

impl Model for NitfFile<FileSource> {
    type MyType = NitfFile<FileSource>;
    type Error = Error;

    /// Returns a Model for the given NITF file
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the nitf file.
    ///
    /// # Examples
    /// ```no_run
    /// use nitf_oxide::base::Model;
    /// use nitf_oxide::model::nitf::NitfFile;
    /// let my_nitf = NitfFile::open("/path/to/nitf/file.NTF").unwrap();
    /// ```
    fn open<P: AsRef<Path>>(path: P) -> Result<NitfFile<FileSource>> {
        NitfFile::from_reader(File::open(path.as_ref())?)
    }
}

impl NitfFile<Vec<u8>> {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        NitfFile::parse(bytes)
    }
}

impl<R: Read + Seek + Send> NitfFile<ReaderSource<R>> {
    pub fn from_reader(reader: R) -> Result<Self> {
        NitfFile::parse(ReaderSource::new(reader)?)
    }
}

impl<S: ByteSource> NitfFile<S> {
    pub fn parse(source: S) -> Result<Self> {
        NitfFile::parse_with(source, ParseOptions::default())
    }

    pub fn parse_with(source: S, options: ParseOptions) -> Result<Self> {
        let header = parse_header(&mut FieldReader::new(&source))?;
        let index = SegmentIndex::accumulate(&header)?;

        let available = source.len();
        let inconsistency = index.inconsistency(&header).or_else(|| {
            (available > header.file_length).then(|| Inconsistency {
                what: "file",
                declared: header.file_length,
                computed: available,
            })
        });
        if inconsistency.is_none() && available < header.file_length {
            return Err(Error::TruncatedInput {
                offset: available,
                needed: header.file_length - available,
                available: 0,
            });
        }
        if let Some(inconsistency) = inconsistency {
            if options.strict {
                return Err(Error::StructuralInconsistency(inconsistency));
            }
            warn!(%inconsistency, "accepting structurally inconsistent NITF file");
        }

        debug!(
            version = %header.version(),
            header_length = header.header_length,
            file_length = header.file_length,
            segments = index.len(),
            "parsed NITF file header"
        );
        Ok(NitfFile {
            source,
            header,
            index,
            inconsistency,
        })
    }

    /// The nine byte version tag, e.g. `NITF02.10`.
    pub fn version(&self) -> &'static str {
        self.header.version_string()
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn header_length(&self) -> u32 {
        self.header.header_length
    }

    pub fn index(&self) -> &SegmentIndex {
        &self.index
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Inconsistency accepted by a lenient parse.
    pub fn inconsistency(&self) -> Option<Inconsistency> {
        self.inconsistency
    }

    pub fn count(&self, category: SegmentCategory) -> u16 {
        self.index.count(category)
    }

    pub fn num_images(&self) -> u16 {
        self.count(SegmentCategory::Image)
    }

    pub fn num_des(&self) -> u16 {
        self.count(SegmentCategory::Des)
    }

    pub fn list(&self, category: SegmentCategory) -> &[SegmentDescriptor] {
        self.index.list(category)
    }

    pub fn descriptor(&self, category: SegmentCategory, index: u16) -> Result<&SegmentDescriptor> {
        self.index.get(category, index)
    }

    /// The segment's sub-header bytes.
    pub fn extract_header(&self, descriptor: &SegmentDescriptor) -> Result<Vec<u8>> {
        self.read_range(descriptor.offset, u64::from(descriptor.header_length))
    }

    /// The segment's data bytes.
    pub fn extract_data(&self, descriptor: &SegmentDescriptor) -> Result<Vec<u8>> {
        self.read_range(descriptor.data_offset(), descriptor.data_length)
    }

    /// Sub-header followed by data, as one buffer.
    pub fn extract_segment(&self, descriptor: &SegmentDescriptor) -> Result<Vec<u8>> {
        self.read_range(descriptor.offset, descriptor.end() - descriptor.offset)
    }

    /// DES `index`, sub-header followed by data.
    pub fn extract_des(&self, index: u16) -> Result<Vec<u8>> {
        self.extract_segment(self.descriptor(SegmentCategory::Des, index)?)
    }

    /// DES `index` sub-header alone.
    pub fn extract_des_header(&self, index: u16) -> Result<Vec<u8>> {
        self.extract_header(self.descriptor(SegmentCategory::Des, index)?)
    }

    /// Write every DES, sub-header followed by data, to `out_dir` as
    /// `des_NNN.des` and return the paths written. A DES that cannot be
    /// written is logged and skipped.
    #[instrument(skip_all, fields(out_dir = %out_dir.display()))]
    pub fn extract_all_des(&self, out_dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(out_dir)?;
        let mut written = Vec::new();
        for descriptor in self.list(SegmentCategory::Des) {
            let path = out_dir.join(format!("des_{:03}.des", descriptor.index));
            match self.write_range(&path, descriptor.offset, descriptor.end() - descriptor.offset) {
                Ok(()) => written.push(path),
                Err(error) => warn!(index = descriptor.index, %error, "skipping DES"),
            }
        }
        info!(count = written.len(), "extracted data extension segments");
        Ok(written)
    }

    /// Stream `len` bytes at `offset` into a new file at `path`. A file left
    /// half written by a failed read is removed.
    pub(crate) fn write_range(&self, path: &Path, offset: u64, len: u64) -> Result<()> {
        let mut sink = BufWriter::new(File::create(path)?);
        let mut reader = SegmentReader::new(&self.source, offset, len);
        if let Err(error) = io::copy(&mut reader, &mut sink).and_then(|_| sink.flush()) {
            drop(sink);
            if let Err(remove) = fs::remove_file(path) {
                debug!(path = %path.display(), error = %remove, "could not remove partial file");
            }
            return Err(error.into());
        }
        debug!(path = %path.display(), bytes = len, "wrote segment bytes");
        Ok(())
    }

    /// Stream the segment's data without buffering it.
    pub fn segment_reader(&self, descriptor: &SegmentDescriptor) -> SegmentReader<'_, S> {
        SegmentReader::new(&self.source, descriptor.data_offset(), descriptor.data_length)
    }

    pub fn image_subheader(&self, index: u16) -> Result<ImageSubheader> {
        let descriptor = self.descriptor(SegmentCategory::Image, index)?;
        let bytes = self.extract_header(descriptor)?;
        ImageSubheader::parse(&bytes, self.header.version())
            .map_err(|error| rebase(error, descriptor.offset))
    }

    pub fn subheader(&self, category: SegmentCategory, index: u16) -> Result<Subheader> {
        let descriptor = self.descriptor(category, index)?;
        self.parse_subheader(descriptor)
    }

    /// Parse every sub-header in file order.
    pub fn subheaders(&self) -> Vec<(SegmentDescriptor, Result<Subheader>)> {
        self.index
            .iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|descriptor| (*descriptor, self.parse_subheader(descriptor)))
            .collect()
    }

    pub(crate) fn read_range(&self, offset: u64, len: u64) -> Result<Vec<u8>> {
        let len = usize::try_from(len).map_err(|_| Error::TruncatedInput {
            offset,
            needed: len,
            available: self.source.len().saturating_sub(offset),
        })?;
        FieldReader::at(&self.source, offset).read_fixed(len)
    }

    fn parse_subheader(&self, descriptor: &SegmentDescriptor) -> Result<Subheader> {
        let bytes = self.extract_header(descriptor)?;
        Subheader::parse(&bytes, descriptor.category, self.header.version())
            .map_err(|error| rebase(error, descriptor.offset))
    }
}

/// Shift offsets reported against a sub-header buffer to file offsets.
fn rebase(error: Error, base: u64) -> Error {
    match error {
        Error::TruncatedInput {
            offset,
            needed,
            available,
        } => Error::TruncatedInput {
            offset: base + offset,
            needed,
            available,
        },
        Error::MalformedHeader {
            field,
            offset,
            reason,
        } => Error::MalformedHeader {
            field,
            offset: base + offset,
            reason,
        },
        other => other,
    }
}

impl<S: ByteSource> fmt::Display for NitfFile<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, value) in self.header.fields() {
            writeln!(f, "NITF::{}: {}", field, value)?;
        }
        for (descriptor, subheader) in self.subheaders() {
            let prefix = format!("NITF::{}{:03}", descriptor.category.tag(), descriptor.index);
            match subheader {
                Ok(subheader) => {
                    for (field, value) in subheader.fields() {
                        writeln!(f, "{}::{}: {}", prefix, field, value)?;
                    }
                }
                Err(error) => writeln!(f, "{}::ERROR: {}", prefix, error)?,
            }
        }
        if let Some(inconsistency) = self.inconsistency {
            writeln!(f, "NITF::WARNING: {}", inconsistency)?;
        }
        Ok(())
    }
}

impl<S> fmt::Debug for NitfFile<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NitfFile")
            .field("header", &self.header)
            .field("index", &self.index)
            .field("inconsistency", &self.inconsistency)
            .finish()
    }
}
