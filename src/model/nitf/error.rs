use std::fmt;

use thiserror::Error;

use super::SegmentCategory;

/// Errors raised while reading, querying or rewriting a NITF file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A field needs more bytes than the input holds.
    #[error("truncated input: {needed} bytes needed at offset {offset}, {available} available")]
    TruncatedInput {
        offset: u64,
        needed: u64,
        available: u64,
    },

    /// A header field violates the format.
    #[error("malformed header field {field} at offset {offset}: {reason}")]
    MalformedHeader {
        field: String,
        offset: u64,
        reason: String,
    },

    /// Header arithmetic does not add up.
    #[error("structural inconsistency: {0}")]
    StructuralInconsistency(Inconsistency),

    /// A segment index at or beyond the category count.
    #[error("{category} segment {index} out of range ({count} present)")]
    IndexOutOfRange {
        category: SegmentCategory,
        index: u16,
        count: u16,
    },

    /// The copy destination cannot receive segments.
    #[error("incompatible copy target: {reason}")]
    IncompatibleTarget {
        reason: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// The image segment's IC field does not name JPEG 2000.
    #[error("image segment {index} is not JPEG 2000 compressed (IC = {compression:?})")]
    NotJp2Compressed { index: u16, compression: String },

    /// The image segment claims JPEG 2000 but carries neither a JP2 signature
    /// nor a start-of-codestream marker.
    #[error("image segment {index} has no JPEG 2000 signature at offset {offset}")]
    InvalidCodestream { index: u16, offset: u64 },

    /// A rewritten value does not fit its fixed-width field.
    #[error("value {value} does not fit the {width}-digit {field} field")]
    FieldOverflow {
        field: String,
        value: u64,
        width: usize,
    },

    #[error("unknown segment category {0:?}")]
    UnknownCategory(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(
        field: impl Into<String>,
        offset: u64,
        reason: impl Into<String>,
    ) -> Self {
        Error::MalformedHeader {
            field: field.into(),
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn incompatible(reason: impl Into<String>, source: Option<Error>) -> Self {
        Error::IncompatibleTarget {
            reason: reason.into(),
            source: source.map(Box::new),
        }
    }
}

/// A declared length that disagrees with the length computed from the
/// header's tables or with the bytes actually present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inconsistency {
    pub what: &'static str,
    pub declared: u64,
    pub computed: u64,
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} declares {} bytes but {} were found",
            self.what, self.declared, self.computed
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
