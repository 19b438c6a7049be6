//! NITF (National Imagery Transmission Format) container engine.
//!
//! Parses file and segment headers, extracts segments, copies whole segment
//! categories between files and locates embedded JPEG 2000 codestreams.
//!
//! ```no_run
//! use nitf_oxide::base::Model;
//! use nitf_oxide::model::nitf::{NitfFile, SegmentCategory};
//!
//! let nitf = NitfFile::open("/path/to/nitf/file.NTF").unwrap();
//! println!("{} with {} DES", nitf.version(), nitf.count(SegmentCategory::Des));
//! ```

pub mod base;
pub mod model;
pub mod ops;
