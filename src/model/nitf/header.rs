//! NITF file header

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::base::ByteSource;

use super::cursor::{format_ascii_int, parse_ascii_int, FieldReader};
use super::error::{Error, Result};

/// Widest count any category's 3-digit count field can hold.
pub const MAX_SEGMENTS: u64 = 999;

const FL_WIDTH: usize = 12;
const HL_WIDTH: usize = 6;
const COUNT_WIDTH: usize = 3;
const TRAILER_LENGTH_WIDTH: usize = 5;
const OVERFLOW_WIDTH: usize = 3;

// Preamble fields at fixed positions in every version.
const OSTAID: (usize, usize) = (15, 10);
const FDT: (usize, usize) = (25, 14);
const FTITLE: (usize, usize) = (39, 80);
const OPHONE_WIDTH: usize = 18;
const FBKGC_WIDTH: usize = 3;

/// Header layout family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NitfVersion {
    /// NITF 2.1
    Nitf21,
    /// NSIF 1.0, laid out exactly like NITF 2.1
    Nsif10,
    /// NITF 2.0
    Nitf20,
}

impl NitfVersion {
    fn from_tag(profile: &str, version: &str) -> Option<Self> {
        match (profile, version) {
            ("NITF", "02.10") => Some(NitfVersion::Nitf21),
            ("NSIF", "01.00") => Some(NitfVersion::Nsif10),
            ("NITF", "02.00") => Some(NitfVersion::Nitf20),
            _ => None,
        }
    }

    /// The nine byte FHDR + FVER tag.
    pub fn as_str(self) -> &'static str {
        match self {
            NitfVersion::Nitf21 => "NITF02.10",
            NitfVersion::Nsif10 => "NSIF01.00",
            NitfVersion::Nitf20 => "NITF02.00",
        }
    }

    pub fn is_v20(self) -> bool {
        self == NitfVersion::Nitf20
    }

    /// Whether sub-headers written for `other` can be dropped into a file of
    /// this version unchanged.
    pub fn is_layout_compatible(self, other: NitfVersion) -> bool {
        self.is_v20() == other.is_v20()
    }

    fn originator_name_width(self) -> usize {
        if self.is_v20() {
            27
        } else {
            24
        }
    }
}

impl fmt::Display for NitfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Segment families, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SegmentCategory {
    Image,
    Graphic,
    /// NITF 2.0 label segments. NITF 2.1 keeps the slot as the reserved
    /// `NUMX` count, always zero.
    Label,
    Text,
    Des,
    Reserved,
}

impl SegmentCategory {
    pub const ALL: [SegmentCategory; 6] = [
        SegmentCategory::Image,
        SegmentCategory::Graphic,
        SegmentCategory::Label,
        SegmentCategory::Text,
        SegmentCategory::Des,
        SegmentCategory::Reserved,
    ];

    pub(crate) fn slot(self) -> usize {
        self as usize
    }

    /// Widths of the sub-header length and data length fields.
    pub fn length_widths(self) -> (usize, usize) {
        match self {
            SegmentCategory::Image => (6, 10),
            SegmentCategory::Graphic => (4, 6),
            SegmentCategory::Label => (4, 3),
            SegmentCategory::Text => (4, 5),
            SegmentCategory::Des => (4, 9),
            SegmentCategory::Reserved => (4, 7),
        }
    }

    pub fn count_field(self, version: NitfVersion) -> &'static str {
        match self {
            SegmentCategory::Image => "NUMI",
            SegmentCategory::Graphic => "NUMS",
            SegmentCategory::Label if version.is_v20() => "NUML",
            SegmentCategory::Label => "NUMX",
            SegmentCategory::Text => "NUMT",
            SegmentCategory::Des => "NUMDES",
            SegmentCategory::Reserved => "NUMRES",
        }
    }

    pub fn length_fields(self) -> (&'static str, &'static str) {
        match self {
            SegmentCategory::Image => ("LISH", "LI"),
            SegmentCategory::Graphic => ("LSSH", "LS"),
            SegmentCategory::Label => ("LLSH", "LL"),
            SegmentCategory::Text => ("LTSH", "LT"),
            SegmentCategory::Des => ("LDSH", "LD"),
            SegmentCategory::Reserved => ("LRESH", "LRE"),
        }
    }

    /// Two character file part type opening every sub-header.
    pub fn part_type(self) -> &'static str {
        match self {
            SegmentCategory::Image => "IM",
            SegmentCategory::Graphic => "SY",
            SegmentCategory::Label => "LA",
            SegmentCategory::Text => "TE",
            SegmentCategory::Des => "DE",
            SegmentCategory::Reserved => "RE",
        }
    }

    /// Upper-case name used in field listings.
    pub fn tag(self) -> &'static str {
        match self {
            SegmentCategory::Image => "IMAGE",
            SegmentCategory::Graphic => "GRAPHIC",
            SegmentCategory::Label => "LABEL",
            SegmentCategory::Text => "TEXT",
            SegmentCategory::Des => "DES",
            SegmentCategory::Reserved => "RES",
        }
    }
}

impl FromStr for SegmentCategory {
    type Err = Error;

    /// Accepts the lower-case names used on the command line.
    fn from_str(name: &str) -> Result<Self> {
        match name {
            "image" => Ok(SegmentCategory::Image),
            "graphic" => Ok(SegmentCategory::Graphic),
            "label" => Ok(SegmentCategory::Label),
            "text" => Ok(SegmentCategory::Text),
            "des" => Ok(SegmentCategory::Des),
            "res" => Ok(SegmentCategory::Reserved),
            other => Err(Error::UnknownCategory(other.to_string())),
        }
    }
}

impl fmt::Display for SegmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SegmentCategory::Image => "image",
            SegmentCategory::Graphic => "graphic",
            SegmentCategory::Label => "label",
            SegmentCategory::Text => "text",
            SegmentCategory::Des => "data extension",
            SegmentCategory::Reserved => "reserved extension",
        };
        f.write_str(name)
    }
}

/// One row of a category's length table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentLengths {
    pub header_length: u32,
    pub data_length: u64,
}

impl SegmentLengths {
    pub fn total(&self) -> u64 {
        u64::from(self.header_length) + self.data_length
    }
}

/// Length tables for every category, indexed in file order.
pub type LengthTables = [Vec<SegmentLengths>; 6];

/// Tagged record extension carried in the user-defined or extended header
/// data areas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tre {
    pub tag: String,
    pub data: Vec<u8>,
}

/// Parsed NITF file header.
///
/// The bytes before `FL` and after the length tables are kept verbatim so a
/// rewritten header reproduces the security block and extensions exactly.
/// Decoded preamble fields are read-only except through the `set_*` methods,
/// which patch the kept bytes as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    version: NitfVersion,
    complexity_level: String,
    standard_type: String,
    originating_station: String,
    date_time: String,
    title: String,
    classification: String,
    originator_name: String,
    originator_phone: String,
    background_color: Option<[u8; 3]>,
    pub header_length: u32,
    pub file_length: u64,
    user_defined: Vec<Tre>,
    extended: Vec<Tre>,
    tables: LengthTables,
    preamble: Vec<u8>,
    trailer: Vec<u8>,
}

/// Parse the file header starting at the reader's current position.
pub fn parse_header<S: ByteSource + ?Sized>(reader: &mut FieldReader<'_, S>) -> Result<FileHeader> {
    let start = reader.position();

    let profile = reader.read_string(4)?;
    let fver = reader.read_string(5)?;
    let version = NitfVersion::from_tag(&profile, &fver).ok_or_else(|| {
        Error::malformed(
            "FHDR",
            start,
            format!("unsupported profile {:?}", format!("{}{}", profile, fver)),
        )
    })?;

    let complexity_level = reader.read_trimmed(2)?;
    let standard_type = reader.read_trimmed(4)?;
    let originating_station = reader.read_trimmed(10)?;
    let date_time = reader.read_string(14)?;
    let title = reader.read_trimmed(80)?;
    let classification = read_security(reader, version)?;

    // FSCOP, FSCPYS
    reader.skip(10)?;
    let encryption_offset = reader.position();
    let encryption = reader.read_string(1)?;
    if encryption != "0" {
        return Err(Error::malformed(
            "ENCRYP",
            encryption_offset,
            "encrypted files are not supported",
        ));
    }

    let background_color = if version.is_v20() {
        None
    } else {
        let rgb = reader.read_fixed(3)?;
        Some([rgb[0], rgb[1], rgb[2]])
    };
    let originator_name = reader.read_trimmed(version.originator_name_width())?;
    let originator_phone = reader.read_trimmed(OPHONE_WIDTH)?;

    let preamble_end = reader.position();
    let file_length = reader.read_ascii_int(FL_WIDTH, "FL")?;
    let hl_offset = reader.position();
    let header_length = reader.read_ascii_int(HL_WIDTH, "HL")?;

    let mut tables = LengthTables::default();
    for category in SegmentCategory::ALL.iter().copied() {
        tables[category.slot()] = read_length_table(reader, category, version)?;
    }

    let trailer_start = reader.position();
    let user_defined = read_tre_area(reader, "UDHDL", "UDHD")?;
    let extended = read_tre_area(reader, "XHDL", "XHD")?;
    let trailer_end = reader.position();

    if trailer_end - start != header_length {
        return Err(Error::malformed(
            "HL",
            hl_offset,
            format!(
                "declares {} bytes but the header fields end after {}",
                header_length,
                trailer_end - start
            ),
        ));
    }

    reader.seek(start)?;
    let preamble = reader.read_fixed((preamble_end - start) as usize)?;
    reader.seek(trailer_start)?;
    let trailer = reader.read_fixed((trailer_end - trailer_start) as usize)?;

    let header = FileHeader {
        version,
        complexity_level,
        standard_type,
        originating_station,
        date_time,
        title,
        classification,
        originator_name,
        originator_phone,
        background_color,
        header_length: header_length as u32,
        file_length,
        user_defined,
        extended,
        tables,
        preamble,
        trailer,
    };
    // Checked once here so later offset arithmetic cannot overflow.
    header.computed_file_length()?;
    Ok(header)
}

/// Read the security block shared by the file header and every sub-header,
/// returning the classification code.
pub(crate) fn read_security<S: ByteSource + ?Sized>(
    reader: &mut FieldReader<'_, S>,
    version: NitfVersion,
) -> Result<String> {
    let classification = reader.read_string(1)?;
    if version.is_v20() {
        // CODE, CTLH, REL, CAUT, CTLN
        reader.skip(160)?;
        let downgrade = reader.read_string(6)?;
        if downgrade == "999998" {
            // DEVT
            reader.skip(40)?;
        }
    } else {
        reader.skip(166)?;
    }
    Ok(classification)
}

fn read_length_table<S: ByteSource + ?Sized>(
    reader: &mut FieldReader<'_, S>,
    category: SegmentCategory,
    version: NitfVersion,
) -> Result<Vec<SegmentLengths>> {
    let count_field = category.count_field(version);
    let count_offset = reader.position();
    let count = reader.read_ascii_int(COUNT_WIDTH, count_field)?;
    if count > MAX_SEGMENTS {
        return Err(Error::malformed(count_field, count_offset, "count above 999"));
    }
    if category == SegmentCategory::Label && !version.is_v20() && count != 0 {
        return Err(Error::malformed(
            count_field,
            count_offset,
            "reserved field must be 000",
        ));
    }

    let (header_width, data_width) = category.length_widths();
    let (header_field, data_field) = category.length_fields();
    let needed = count * (header_width + data_width) as u64;
    if needed > reader.remaining() {
        return Err(Error::TruncatedInput {
            offset: reader.position(),
            needed,
            available: reader.remaining(),
        });
    }

    let mut table = Vec::with_capacity(count as usize);
    for n in 1..=count {
        let header_length = reader.read_ascii_int(header_width, &format!("{}{:03}", header_field, n))?;
        let data_length = reader.read_ascii_int(data_width, &format!("{}{:03}", data_field, n))?;
        table.push(SegmentLengths {
            header_length: header_length as u32,
            data_length,
        });
    }
    Ok(table)
}

fn read_tre_area<S: ByteSource + ?Sized>(
    reader: &mut FieldReader<'_, S>,
    length_field: &str,
    area: &str,
) -> Result<Vec<Tre>> {
    let length = reader.read_ascii_int(TRAILER_LENGTH_WIDTH, length_field)?;
    if length == 0 {
        return Ok(Vec::new());
    }
    let area_offset = reader.position();
    if length < OVERFLOW_WIDTH as u64 {
        return Err(Error::malformed(
            length_field,
            area_offset - TRAILER_LENGTH_WIDTH as u64,
            "shorter than its overflow field",
        ));
    }
    let bytes = reader.read_fixed(length as usize)?;
    parse_tres(
        &bytes[OVERFLOW_WIDTH..],
        area_offset + OVERFLOW_WIDTH as u64,
        area,
    )
}

/// Split a run of `tag(6) length(5) data` records.
pub fn parse_tres(bytes: &[u8], base_offset: u64, area: &str) -> Result<Vec<Tre>> {
    let mut tres = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let offset = base_offset + i as u64;
        if bytes.len() - i < 11 {
            return Err(Error::malformed(area, offset, "partial TRE prefix"));
        }
        let tag = String::from_utf8_lossy(&bytes[i..i + 6]).trim().to_string();
        let length = parse_ascii_int(&bytes[i + 6..i + 11], &format!("{}.CEL", tag), offset + 6)? as usize;
        i += 11;
        if bytes.len() - i < length {
            return Err(Error::malformed(
                area,
                offset,
                format!("TRE {} runs past the end of its area", tag),
            ));
        }
        tres.push(Tre {
            tag,
            data: bytes[i..i + length].to_vec(),
        });
        i += length;
    }
    Ok(tres)
}

impl FileHeader {
    /// Minimal valid header with no segments.
    pub fn skeleton(version: NitfVersion) -> Result<FileHeader> {
        let mut bytes = Vec::with_capacity(388);
        bytes.extend_from_slice(version.as_str().as_bytes());
        bytes.extend_from_slice(b"03BF01");
        bytes.extend_from_slice(&[b' '; 10]);
        // Unknown date and time.
        bytes.extend_from_slice(&[b'-'; 14]);
        bytes.extend_from_slice(&[b' '; 80]);
        bytes.push(b'U');
        bytes.extend_from_slice(&[b' '; 166]);
        bytes.extend_from_slice(b"00000000000");
        if !version.is_v20() {
            bytes.extend_from_slice(&[0, 0, 0]);
        }
        bytes.extend_from_slice(&vec![b' '; version.originator_name_width()]);
        bytes.extend_from_slice(&[b' '; OPHONE_WIDTH]);
        bytes.extend_from_slice(b"000000000388000388");
        bytes.extend_from_slice(b"000000000000000000");
        bytes.extend_from_slice(b"0000000000");
        parse_header(&mut FieldReader::new(&bytes))
    }

    pub fn version(&self) -> NitfVersion {
        self.version
    }

    /// The nine byte version tag, e.g. `NITF02.10`.
    pub fn version_string(&self) -> &'static str {
        self.version.as_str()
    }

    pub fn complexity_level(&self) -> &str {
        &self.complexity_level
    }

    pub fn standard_type(&self) -> &str {
        &self.standard_type
    }

    /// `OSTAID`, trimmed.
    pub fn originating_station(&self) -> &str {
        &self.originating_station
    }

    /// `FDT` as stored.
    pub fn date_time(&self) -> &str {
        &self.date_time
    }

    /// `FTITLE`, trimmed.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// `FSCLAS`. The rest of the security block is kept as raw bytes.
    pub fn classification(&self) -> &str {
        &self.classification
    }

    pub fn originator_name(&self) -> &str {
        &self.originator_name
    }

    pub fn originator_phone(&self) -> &str {
        &self.originator_phone
    }

    /// `FBKGC`; NITF 2.0 headers have none.
    pub fn background_color(&self) -> Option<[u8; 3]> {
        self.background_color
    }

    /// TREs of the user-defined header data area.
    pub fn user_defined(&self) -> &[Tre] {
        &self.user_defined
    }

    /// TREs of the extended header data area.
    pub fn extended(&self) -> &[Tre] {
        &self.extended
    }

    pub fn set_originating_station(&mut self, value: &str) -> Result<()> {
        self.patch_text("OSTAID", OSTAID.0, OSTAID.1, value)?;
        self.originating_station = value.trim().to_string();
        Ok(())
    }

    /// Set `FDT`, which must be exactly 14 characters.
    pub fn set_date_time(&mut self, value: &str) -> Result<()> {
        if value.len() != FDT.1 {
            return Err(Error::malformed(
                "FDT",
                FDT.0 as u64,
                format!("{:?} is not {} characters", value, FDT.1),
            ));
        }
        self.patch_text("FDT", FDT.0, FDT.1, value)?;
        self.date_time = value.to_string();
        Ok(())
    }

    pub fn set_title(&mut self, value: &str) -> Result<()> {
        self.patch_text("FTITLE", FTITLE.0, FTITLE.1, value)?;
        self.title = value.trim().to_string();
        Ok(())
    }

    pub fn set_originator_name(&mut self, value: &str) -> Result<()> {
        let width = self.version.originator_name_width();
        let offset = self.preamble.len() - OPHONE_WIDTH - width;
        self.patch_text("ONAME", offset, width, value)?;
        self.originator_name = value.trim().to_string();
        Ok(())
    }

    pub fn set_originator_phone(&mut self, value: &str) -> Result<()> {
        let offset = self.preamble.len() - OPHONE_WIDTH;
        self.patch_text("OPHONE", offset, OPHONE_WIDTH, value)?;
        self.originator_phone = value.trim().to_string();
        Ok(())
    }

    pub fn set_background_color(&mut self, rgb: [u8; 3]) -> Result<()> {
        let offset =
            self.preamble.len() - OPHONE_WIDTH - self.version.originator_name_width() - FBKGC_WIDTH;
        if self.version.is_v20() {
            return Err(Error::malformed(
                "FBKGC",
                offset as u64,
                "NITF 2.0 headers have no background colour",
            ));
        }
        self.preamble[offset..offset + FBKGC_WIDTH].copy_from_slice(&rgb);
        self.background_color = Some(rgb);
        Ok(())
    }

    /// Overwrite a space-padded text field of the preamble.
    fn patch_text(&mut self, field: &str, offset: usize, width: usize, value: &str) -> Result<()> {
        if !value.is_ascii() || value.len() > width {
            return Err(Error::malformed(
                field,
                offset as u64,
                format!("{:?} does not fit {} ASCII characters", value, width),
            ));
        }
        let padded = format!("{:<width$}", value, width = width);
        self.preamble[offset..offset + width].copy_from_slice(padded.as_bytes());
        Ok(())
    }

    pub fn count(&self, category: SegmentCategory) -> u16 {
        self.tables[category.slot()].len() as u16
    }

    pub fn lengths(&self, category: SegmentCategory) -> &[SegmentLengths] {
        &self.tables[category.slot()]
    }

    pub fn tables(&self) -> &LengthTables {
        &self.tables
    }

    /// `HL` plus every sub-header and data length in the tables.
    pub fn computed_file_length(&self) -> Result<u64> {
        self.tables
            .iter()
            .flatten()
            .try_fold(u64::from(self.header_length), |acc, lengths| {
                acc.checked_add(lengths.total())
            })
            .ok_or_else(|| Error::malformed("FL", self.fl_offset(), "segment lengths overflow"))
    }

    /// A copy of this header carrying `tables`, with `HL` and `FL`
    /// recomputed. Everything else is unchanged.
    pub fn with_tables(&self, tables: LengthTables) -> Result<FileHeader> {
        if !self.version.is_v20() && !tables[SegmentCategory::Label.slot()].is_empty() {
            return Err(Error::malformed(
                "NUMX",
                0,
                "label segments only exist in NITF 2.0",
            ));
        }
        let table_bytes: usize = SegmentCategory::ALL
            .iter()
            .map(|category| {
                let (header_width, data_width) = category.length_widths();
                COUNT_WIDTH + tables[category.slot()].len() * (header_width + data_width)
            })
            .sum();
        let header_length =
            self.preamble.len() + FL_WIDTH + HL_WIDTH + table_bytes + self.trailer.len();

        let mut header = FileHeader {
            header_length: header_length as u32,
            file_length: 0,
            tables,
            ..self.clone()
        };
        header.file_length = header.computed_file_length()?;
        // Surface width overflows now rather than when writing.
        header.to_bytes()?;
        Ok(header)
    }

    /// Serialise the header exactly `header_length` bytes long.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.header_length as usize);
        out.extend_from_slice(&self.preamble);
        out.extend_from_slice(&format_ascii_int(self.file_length, FL_WIDTH, "FL")?);
        out.extend_from_slice(&format_ascii_int(
            u64::from(self.header_length),
            HL_WIDTH,
            "HL",
        )?);
        for category in SegmentCategory::ALL.iter().copied() {
            let table = &self.tables[category.slot()];
            out.extend_from_slice(&format_ascii_int(
                table.len() as u64,
                COUNT_WIDTH,
                category.count_field(self.version),
            )?);
            let (header_width, data_width) = category.length_widths();
            let (header_field, data_field) = category.length_fields();
            for lengths in table {
                out.extend_from_slice(&format_ascii_int(
                    u64::from(lengths.header_length),
                    header_width,
                    header_field,
                )?);
                out.extend_from_slice(&format_ascii_int(
                    lengths.data_length,
                    data_width,
                    data_field,
                )?);
            }
        }
        out.extend_from_slice(&self.trailer);
        Ok(out)
    }

    /// Every decoded field keyed by its NITF field name.
    pub fn fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        let (profile, version) = self.version.as_str().split_at(4);
        fields.insert("FHDR".to_string(), profile.to_string());
        fields.insert("FVER".to_string(), version.to_string());
        fields.insert("CLEVEL".to_string(), self.complexity_level.clone());
        fields.insert("STYPE".to_string(), self.standard_type.clone());
        fields.insert("OSTAID".to_string(), self.originating_station.clone());
        fields.insert("FDT".to_string(), self.formatted_date_time());
        if !self.title.is_empty() {
            fields.insert("FTITLE".to_string(), self.title.clone());
        }
        fields.insert("FSCLAS".to_string(), self.classification.clone());
        if let Some([r, g, b]) = self.background_color {
            fields.insert("FBKGC".to_string(), format!("0x{:02X}{:02X}{:02X}", r, g, b));
        }
        if !self.originator_name.is_empty() {
            fields.insert("ONAME".to_string(), self.originator_name.clone());
        }
        if !self.originator_phone.is_empty() {
            fields.insert("OPHONE".to_string(), self.originator_phone.clone());
        }
        fields.insert("FL".to_string(), self.file_length.to_string());
        fields.insert("HL".to_string(), self.header_length.to_string());

        for category in SegmentCategory::ALL.iter().copied() {
            let table = &self.tables[category.slot()];
            fields.insert(
                category.count_field(self.version).to_string(),
                format!("{:03}", table.len()),
            );
            let (header_field, data_field) = category.length_fields();
            for (n, lengths) in table.iter().enumerate() {
                fields.insert(
                    format!("{}{:03}", header_field, n + 1),
                    lengths.header_length.to_string(),
                );
                fields.insert(
                    format!("{}{:03}", data_field, n + 1),
                    lengths.data_length.to_string(),
                );
            }
        }

        for tre in self.user_defined.iter().chain(self.extended.iter()) {
            fields.insert(
                tre.tag.clone(),
                String::from_utf8_lossy(&tre.data).trim().to_string(),
            );
        }
        fields
    }

    /// `FDT` as `YYYY/MM/DD hh:mm:ss` for NITF 2.1 style dates, raw otherwise.
    fn formatted_date_time(&self) -> String {
        let fdt = &self.date_time;
        if self.version.is_v20() || fdt.len() != 14 || !fdt.is_ascii() {
            return fdt.clone();
        }
        format!(
            "{}/{}/{} {}:{}:{}",
            &fdt[0..4],
            &fdt[4..6],
            &fdt[6..8],
            &fdt[8..10],
            &fdt[10..12],
            &fdt[12..14]
        )
    }

    fn fl_offset(&self) -> u64 {
        self.preamble.len() as u64
    }
}
