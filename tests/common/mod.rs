#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use hex_literal::hex;
use nitf_oxide::model::nitf::{
    parse_header, FieldReader, FileHeader, NitfBuilder, NitfVersion, SegmentCategory,
};

fn security() -> Vec<u8> {
    let mut bytes = vec![b'U'];
    bytes.extend_from_slice(&[b' '; 166]);
    bytes
}

fn padded(value: &str, width: usize) -> Vec<u8> {
    format!("{:<width$}", value, width = width).into_bytes()
}

/// NITF 2.1 image sub-header with one band and no extensions.
pub fn image_subheader(id: &str, compression: &str) -> Vec<u8> {
    let mut bytes = b"IM".to_vec();
    bytes.extend(padded(id, 10));
    bytes.extend_from_slice(b"20240101120000");
    bytes.extend(padded("", 17));
    bytes.extend(padded("fixture image", 80));
    bytes.extend(security());
    // ENCRYP
    bytes.push(b'0');
    bytes.extend(padded("", 42));
    bytes.extend_from_slice(b"0000000800000008");
    bytes.extend_from_slice(b"INT");
    bytes.extend(padded("MONO", 8));
    bytes.extend(padded("VIS", 8));
    bytes.extend_from_slice(b"08");
    bytes.push(b'R');
    // ICORDS blank, so no IGEOLO
    bytes.push(b' ');
    // NICOM
    bytes.push(b'0');
    bytes.extend_from_slice(compression.as_bytes());
    if compression != "NC" && compression != "NM" {
        bytes.extend_from_slice(b"N001");
    }
    // NBANDS, IREPBAND, ISUBCAT, IFC, IMFLT, NLUTS
    bytes.extend_from_slice(b"1");
    bytes.extend(padded("M", 2));
    bytes.extend(padded("", 6));
    bytes.extend_from_slice(b"N   0");
    // ISYNC, IMODE, NBPR, NBPC, NPPBH, NPPBV, NBPP, IDLVL, IALVL, ILOC, IMAG
    bytes.extend_from_slice(b"0B0001000100080008");
    bytes.extend_from_slice(b"08001000");
    bytes.extend_from_slice(b"00000000001.0 ");
    // UDIDL, IXSHDL
    bytes.extend_from_slice(b"0000000000");
    bytes
}

pub fn des_subheader(id: &str) -> Vec<u8> {
    let mut bytes = b"DE".to_vec();
    bytes.extend(padded(id, 25));
    bytes.extend_from_slice(b"01");
    bytes.extend(security());
    // DESSHL
    bytes.extend_from_slice(b"0000");
    bytes
}

pub fn text_subheader(id: &str) -> Vec<u8> {
    let mut bytes = b"TE".to_vec();
    bytes.extend(padded(id, 7));
    bytes.extend_from_slice(b"000");
    bytes.extend_from_slice(b"20240101120000");
    bytes.extend(padded("fixture text", 80));
    bytes.extend(security());
    // ENCRYP, TXTFMT, TXSHDL
    bytes.extend_from_slice(b"0STA00000");
    bytes
}

pub fn graphic_subheader(id: &str) -> Vec<u8> {
    let mut bytes = b"SY".to_vec();
    bytes.extend(padded(id, 10));
    bytes.extend(padded("fixture graphic", 20));
    bytes.extend(security());
    // ENCRYP, SFMT, SSTRUCT
    bytes.extend_from_slice(b"0C0000000000000");
    // SDLVL, SALVL, SLOC, SBND1, SCOLOR, SBND2, SRES, SXSHDL
    bytes.extend_from_slice(b"001000000000000000000000C00100010000000000");
    bytes
}

/// A JP2 file: signature, file type and a codestream box.
pub fn jp2_boxed() -> Vec<u8> {
    let mut bytes = hex!("0000000C 6A502020 0D0A870A").to_vec();
    bytes.extend_from_slice(&hex!("00000014 66747970 6A703220 00000000 6A703220"));
    bytes.extend_from_slice(&hex!("00000010 6A703263 FF4FFF51 0000FFD9"));
    bytes
}

/// A bare codestream, SOC through EOC.
pub fn j2k_codestream() -> Vec<u8> {
    hex!("FF4FFF51 00290000 00000008 FFD9").to_vec()
}

/// Three images: boxed JP2, uncompressed, bare codestream.
pub fn three_image_file() -> Vec<u8> {
    NitfBuilder::version(NitfVersion::Nitf21)
        .unwrap()
        .segment(SegmentCategory::Image, image_subheader("JP2", "C8"), jp2_boxed())
        .segment(SegmentCategory::Image, image_subheader("RAW", "NC"), vec![0x7Fu8; 64])
        .segment(SegmentCategory::Image, image_subheader("J2K", "C8"), j2k_codestream())
        .build()
        .unwrap()
}

/// One of every NITF 2.1 category except labels.
pub fn mixed_file() -> Vec<u8> {
    NitfBuilder::version(NitfVersion::Nitf21)
        .unwrap()
        .segment(SegmentCategory::Image, image_subheader("IMG", "C8"), jp2_boxed())
        .segment(SegmentCategory::Graphic, graphic_subheader("SYM"), b"CGM-ish".to_vec())
        .segment(SegmentCategory::Text, text_subheader("TXT"), b"hello".to_vec())
        .segment(SegmentCategory::Des, des_subheader("DES_A"), b"des a".to_vec())
        .segment(SegmentCategory::Des, des_subheader("DES_B"), b"des b payload".to_vec())
        .build()
        .unwrap()
}

/// NITF 2.0 header whose FSDWNG is `999998`, so a 40 byte FSDEVT follows.
pub fn nitf20_header_with_downgrade_event() -> FileHeader {
    let mut bytes = b"NITF02.0003BF01".to_vec();
    bytes.extend(padded("STATION20", 10));
    bytes.extend_from_slice(b"01123045ZJAN24");
    bytes.extend(padded("nitf 2.0 fixture", 80));
    bytes.push(b'U');
    bytes.extend(padded("", 160));
    bytes.extend_from_slice(b"999998");
    bytes.extend(padded("downgrade on review", 40));
    // FSCOP, FSCPYS, ENCRYP
    bytes.extend_from_slice(b"00000000000");
    bytes.extend(padded("originator", 27));
    bytes.extend(padded("", 18));
    assert_eq!(bytes.len(), 382);
    bytes.extend_from_slice(b"000000000428000428");
    bytes.extend_from_slice(b"000000000000000000");
    bytes.extend_from_slice(b"0000000000");
    parse_header(&mut FieldReader::new(&bytes)).unwrap()
}

pub fn label_subheader(id: &str) -> Vec<u8> {
    let mut bytes = b"LA".to_vec();
    bytes.extend(padded(id, 10));
    bytes.extend(security());
    bytes
}

/// NITF 2.0 file with one label and one DES.
pub fn nitf20_file() -> Vec<u8> {
    NitfBuilder::new(nitf20_header_with_downgrade_event())
        .segment(SegmentCategory::Label, label_subheader("LBL"), b"label text".to_vec())
        .segment(SegmentCategory::Des, des_subheader("DES20"), b"payload".to_vec())
        .build()
        .unwrap()
}

/// Two C8 images, each a bare codestream padded to `padding` extra bytes.
pub fn two_codestream_file(padding: usize) -> Vec<u8> {
    let mut data = j2k_codestream();
    data.extend(vec![0u8; padding]);
    NitfBuilder::version(NitfVersion::Nitf21)
        .unwrap()
        .segment(SegmentCategory::Image, image_subheader("ONE", "C8"), data.clone())
        .segment(SegmentCategory::Image, image_subheader("TWO", "C8"), data)
        .build()
        .unwrap()
}

pub fn des_file(ids: &[&str]) -> Vec<u8> {
    let mut builder = NitfBuilder::version(NitfVersion::Nitf21).unwrap();
    for id in ids {
        builder.add_segment(SegmentCategory::Des, des_subheader(id), id.as_bytes().to_vec());
    }
    builder.build().unwrap()
}

pub fn skeleton(version: NitfVersion) -> Vec<u8> {
    NitfBuilder::version(version).unwrap().build().unwrap()
}

pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

pub fn crc32(bytes: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}

pub fn file_crc32(path: &Path) -> u32 {
    crc32(&fs::read(path).unwrap())
}
