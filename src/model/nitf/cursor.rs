//! Fixed-width field reading

use crate::base::ByteSource;

use super::error::{Error, Result};

/// Sequential reader of fixed-width fields over a [`ByteSource`].
///
/// Every NITF length and count is ASCII digits, so numbers are only ever
/// produced by [`read_ascii_int`](Self::read_ascii_int).
pub struct FieldReader<'a, S: ?Sized> {
    source: &'a S,
    position: u64,
}

impl<'a, S: ByteSource + ?Sized> FieldReader<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self::at(source, 0)
    }

    pub fn at(source: &'a S, offset: u64) -> Self {
        Self {
            source,
            position: offset,
        }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn remaining(&self) -> u64 {
        self.source.len().saturating_sub(self.position)
    }

    pub fn seek(&mut self, offset: u64) -> Result<()> {
        if offset > self.source.len() {
            return Err(Error::TruncatedInput {
                offset,
                needed: 0,
                available: 0,
            });
        }
        self.position = offset;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.position += n as u64;
        Ok(())
    }

    pub fn read_fixed(&mut self, n: usize) -> Result<Vec<u8>> {
        self.ensure(n)?;
        let mut buf = vec![0u8; n];
        self.source.read_at(self.position, &mut buf)?;
        self.position += n as u64;
        Ok(buf)
    }

    /// Read `n` bytes as text, keeping padding.
    pub fn read_string(&mut self, n: usize) -> Result<String> {
        let bytes = self.read_fixed(n)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read `n` bytes as text with surrounding spaces removed.
    pub fn read_trimmed(&mut self, n: usize) -> Result<String> {
        Ok(self.read_string(n)?.trim().to_string())
    }

    pub fn read_ascii_int(&mut self, n: usize, field: &str) -> Result<u64> {
        let offset = self.position;
        let bytes = self.read_fixed(n)?;
        parse_ascii_int(&bytes, field, offset)
    }

    fn ensure(&self, n: usize) -> Result<()> {
        let available = self.remaining();
        if (n as u64) > available {
            return Err(Error::TruncatedInput {
                offset: self.position,
                needed: n as u64,
                available,
            });
        }
        Ok(())
    }
}

/// Convert a zero- or space-padded ASCII digit field.
pub fn parse_ascii_int(bytes: &[u8], field: &str, offset: u64) -> Result<u64> {
    let digits = trim_spaces(bytes);
    if digits.is_empty() {
        return Err(Error::malformed(field, offset, "blank numeric field"));
    }
    if let Some(bad) = digits.iter().find(|b| !b.is_ascii_digit()) {
        return Err(Error::malformed(
            field,
            offset,
            format!("unexpected byte 0x{:02X} in numeric field", bad),
        ));
    }
    digits.iter().try_fold(0u64, |acc, digit| {
        acc.checked_mul(10)
            .and_then(|acc| acc.checked_add(u64::from(digit - b'0')))
            .ok_or_else(|| Error::malformed(field, offset, "numeric field overflows"))
    })
}

/// Render `value` right-aligned and zero-padded to exactly `width` digits.
pub fn format_ascii_int(value: u64, width: usize, field: &str) -> Result<Vec<u8>> {
    let text = format!("{:0width$}", value, width = width);
    if text.len() > width {
        return Err(Error::FieldOverflow {
            field: field.to_string(),
            value,
            width,
        });
    }
    Ok(text.into_bytes())
}

fn trim_spaces(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != b' ').unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| *b != b' ').map_or(start, |i| i + 1);
    &bytes[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_padded_count() {
        assert_eq!(parse_ascii_int(b"003", "NUMDES", 0).unwrap(), 3);
    }

    #[test]
    fn space_padded_length() {
        assert_eq!(parse_ascii_int(b"   42", "LT", 0).unwrap(), 42);
        assert_eq!(parse_ascii_int(b"42   ", "LT", 0).unwrap(), 42);
    }

    #[test]
    fn blank_field_is_malformed() {
        assert!(matches!(
            parse_ascii_int(b"   ", "NUMI", 360),
            Err(Error::MalformedHeader { offset: 360, .. })
        ));
    }

    #[test]
    fn non_digit_is_malformed() {
        assert!(matches!(
            parse_ascii_int(b"0x1", "NUMI", 0),
            Err(Error::MalformedHeader { .. })
        ));
        assert!(matches!(
            parse_ascii_int(b"1 2", "NUMI", 0),
            Err(Error::MalformedHeader { .. })
        ));
    }

    #[test]
    fn never_binary() {
        // 0x00 0x00 0x03 would be 3 as a big-endian integer.
        assert!(parse_ascii_int(&[0, 0, 3], "NUMI", 0).is_err());
    }

    #[test]
    fn reader_tracks_position() {
        let data = b"NITF02.10000123".to_vec();
        let mut reader = FieldReader::new(&data);
        assert_eq!(reader.read_string(9).unwrap(), "NITF02.10");
        assert_eq!(reader.position(), 9);
        assert_eq!(reader.remaining(), 6);
        assert_eq!(reader.read_ascii_int(6, "HL").unwrap(), 123);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn short_read_is_truncated() {
        let data = b"0001".to_vec();
        let mut reader = FieldReader::new(&data);
        reader.skip(2).unwrap();
        match reader.read_fixed(3) {
            Err(Error::TruncatedInput {
                offset,
                needed,
                available,
            }) => {
                assert_eq!((offset, needed, available), (2, 3, 2));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn seek_past_end_is_truncated() {
        let data = vec![0u8; 4];
        let mut reader = FieldReader::new(&data);
        reader.seek(4).unwrap();
        assert!(reader.seek(5).is_err());
    }

    #[test]
    fn format_pads_and_overflows() {
        assert_eq!(format_ascii_int(7, 3, "NUMI").unwrap(), b"007");
        assert!(matches!(
            format_ascii_int(1000, 3, "NUMI"),
            Err(Error::FieldOverflow { width: 3, .. })
        ));
    }
}
