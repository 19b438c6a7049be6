//! Segment sub-headers
//!
//! Only the leading fields of each sub-header are decoded; the rest of the
//! block travels as raw bytes.

use std::collections::BTreeMap;

use super::cursor::FieldReader;
use super::error::{Error, Result};
use super::header::{read_security, NitfVersion, SegmentCategory};

/// Leading fields of an image sub-header, through the compression fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSubheader {
    pub identifier: String,
    pub date_time: String,
    pub target_id: String,
    pub title: String,
    pub classification: String,
    pub source: String,
    pub rows: u64,
    pub columns: u64,
    pub pixel_value_type: String,
    pub representation: String,
    pub image_category: String,
    pub bits_per_pixel: u64,
    pub coordinate_system: String,
    pub geolocation: Option<String>,
    pub comments: Vec<String>,
    pub compression: String,
    pub compression_rate: Option<String>,
}

impl ImageSubheader {
    pub fn parse(bytes: &[u8], version: NitfVersion) -> Result<ImageSubheader> {
        let mut reader = FieldReader::new(bytes);
        expect_part_type(&mut reader, SegmentCategory::Image)?;

        let identifier = reader.read_trimmed(10)?;
        let date_time = reader.read_string(14)?;
        let target_id = reader.read_trimmed(17)?;
        let title = reader.read_trimmed(80)?;
        let classification = read_security(&mut reader, version)?;
        // ENCRYP
        reader.skip(1)?;
        let source = reader.read_trimmed(42)?;
        let rows = reader.read_ascii_int(8, "NROWS")?;
        let columns = reader.read_ascii_int(8, "NCOLS")?;
        let pixel_value_type = reader.read_trimmed(3)?;
        let representation = reader.read_trimmed(8)?;
        let image_category = reader.read_trimmed(8)?;
        let bits_per_pixel = reader.read_ascii_int(2, "ABPP")?;
        // PJUST
        reader.skip(1)?;

        let coordinate_system = reader.read_string(1)?;
        let has_geolocation = if version.is_v20() {
            coordinate_system != "N"
        } else {
            coordinate_system != " "
        };
        let geolocation = if has_geolocation {
            Some(reader.read_string(60)?)
        } else {
            None
        };

        let comment_count = reader.read_ascii_int(1, "NICOM")?;
        let comments = (0..comment_count)
            .map(|_| reader.read_trimmed(80))
            .collect::<Result<Vec<_>>>()?;

        let compression = reader.read_string(2)?;
        let compression_rate = if compression == "NC" || compression == "NM" {
            None
        } else {
            Some(reader.read_string(4)?)
        };

        Ok(ImageSubheader {
            identifier,
            date_time,
            target_id,
            title,
            classification,
            source,
            rows,
            columns,
            pixel_value_type,
            representation,
            image_category,
            bits_per_pixel,
            coordinate_system: coordinate_system.trim().to_string(),
            geolocation,
            comments,
            compression,
            compression_rate,
        })
    }

    /// IC names JPEG 2000, blocked (`C8`) or masked (`M8`).
    pub fn is_jpeg2000(&self) -> bool {
        self.compression == "C8" || self.compression == "M8"
    }

    /// Image data opens with a block/pad mask table.
    pub fn is_masked(&self) -> bool {
        self.compression.starts_with('M')
    }

    pub fn fields(&self) -> BTreeMap<&'static str, String> {
        let mut fields = BTreeMap::new();
        fields.insert("IID1", self.identifier.clone());
        fields.insert("IDATIM", self.date_time.clone());
        if !self.target_id.is_empty() {
            fields.insert("TGTID", self.target_id.clone());
        }
        if !self.title.is_empty() {
            fields.insert("IID2", self.title.clone());
        }
        fields.insert("ISCLAS", self.classification.clone());
        if !self.source.is_empty() {
            fields.insert("ISORCE", self.source.clone());
        }
        fields.insert("NROWS", self.rows.to_string());
        fields.insert("NCOLS", self.columns.to_string());
        fields.insert("PVTYPE", self.pixel_value_type.clone());
        fields.insert("IREP", self.representation.clone());
        fields.insert("ICAT", self.image_category.clone());
        fields.insert("ABPP", self.bits_per_pixel.to_string());
        fields.insert("ICORDS", self.coordinate_system.clone());
        if let Some(geolocation) = &self.geolocation {
            fields.insert("IGEOLO", geolocation.clone());
        }
        fields.insert("NICOM", self.comments.len().to_string());
        fields.insert("IC", self.compression.clone());
        if let Some(rate) = &self.compression_rate {
            fields.insert("COMRAT", rate.clone());
        }
        fields
    }
}

/// Leading fields of a graphic, label, text, DES or RES sub-header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSubheader {
    pub category: SegmentCategory,
    pub identifier: String,
    /// Graphic name or text title.
    pub title: Option<String>,
    /// Text date and time.
    pub date_time: Option<String>,
    /// DES/RES version.
    pub revision: Option<u64>,
    pub classification: String,
}

impl SegmentSubheader {
    pub fn parse(
        bytes: &[u8],
        category: SegmentCategory,
        version: NitfVersion,
    ) -> Result<SegmentSubheader> {
        let mut reader = FieldReader::new(bytes);
        expect_part_type(&mut reader, category)?;

        let mut title = None;
        let mut date_time = None;
        let mut revision = None;
        let identifier = match category {
            SegmentCategory::Graphic => {
                let identifier = reader.read_trimmed(10)?;
                title = Some(reader.read_trimmed(20)?);
                identifier
            }
            SegmentCategory::Label => reader.read_trimmed(10)?,
            SegmentCategory::Text => {
                let identifier = reader.read_trimmed(if version.is_v20() { 10 } else { 7 })?;
                if !version.is_v20() {
                    // TXTALVL
                    reader.skip(3)?;
                }
                date_time = Some(reader.read_string(14)?);
                title = Some(reader.read_trimmed(80)?);
                identifier
            }
            SegmentCategory::Des | SegmentCategory::Reserved => {
                let identifier = reader.read_trimmed(25)?;
                let field = if category == SegmentCategory::Des {
                    "DESVER"
                } else {
                    "RESVER"
                };
                revision = Some(reader.read_ascii_int(2, field)?);
                identifier
            }
            SegmentCategory::Image => {
                return Err(Error::malformed(
                    "IM",
                    0,
                    "image sub-headers are parsed by ImageSubheader",
                ))
            }
        };
        let classification = reader.read_string(1)?;

        Ok(SegmentSubheader {
            category,
            identifier,
            title: title.filter(|t| !t.is_empty()),
            date_time,
            revision,
            classification,
        })
    }

    pub fn fields(&self) -> BTreeMap<&'static str, String> {
        let (id, title, class) = match self.category {
            SegmentCategory::Graphic => ("SID", "SNAME", "SSCLAS"),
            SegmentCategory::Label => ("LID", "", "LSCLAS"),
            SegmentCategory::Text => ("TEXTID", "TXTITL", "TSCLAS"),
            SegmentCategory::Des => ("DESID", "", "DECLAS"),
            _ => ("RESID", "", "RECLAS"),
        };
        let mut fields = BTreeMap::new();
        fields.insert(id, self.identifier.clone());
        if let Some(value) = &self.title {
            fields.insert(title, value.clone());
        }
        if let Some(value) = &self.date_time {
            fields.insert("TXTDT", value.clone());
        }
        if let Some(value) = self.revision {
            let name = if self.category == SegmentCategory::Des {
                "DESVER"
            } else {
                "RESVER"
            };
            fields.insert(name, format!("{:02}", value));
        }
        fields.insert(class, self.classification.clone());
        fields
    }
}

/// Either kind of parsed sub-header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subheader {
    Image(ImageSubheader),
    Segment(SegmentSubheader),
}

impl Subheader {
    pub fn parse(bytes: &[u8], category: SegmentCategory, version: NitfVersion) -> Result<Subheader> {
        match category {
            SegmentCategory::Image => ImageSubheader::parse(bytes, version).map(Subheader::Image),
            _ => SegmentSubheader::parse(bytes, category, version).map(Subheader::Segment),
        }
    }

    pub fn fields(&self) -> BTreeMap<&'static str, String> {
        match self {
            Subheader::Image(image) => image.fields(),
            Subheader::Segment(segment) => segment.fields(),
        }
    }
}

fn expect_part_type(reader: &mut FieldReader<'_, [u8]>, category: SegmentCategory) -> Result<()> {
    let part_type = reader.read_string(2)?;
    if part_type != category.part_type() {
        return Err(Error::malformed(
            category.part_type(),
            0,
            format!("expected {} sub-header, found {:?}", category, part_type),
        ));
    }
    Ok(())
}
