//! Imagery container models

pub mod nitf;
