//! Nibble-swapped string encoding used by industry files
//!
//! Every character occupies two bytes on disk. The character's high nibble
//! sits in the low bits of the first byte and its low nibble in the high bits
//! of the second:
//!
//! - 'A' (0x41) -> [0x04, 0x10]
//! - 'B' (0x42) -> [0x04, 0x20]
//!
//! Despite the 2-byte units only code points 0-255 are representable.
//!
//! On disk each string is framed by a signed 4-byte little-endian count of
//! *encoded* bytes (always twice the character count).

use std::fmt;
use std::io::{Seek, Write};

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};
use crate::record::{write_count, Record, RecordReader, INT_LEN};

/// Encode text, rejecting any character above U+00FF
///
/// Nothing is produced unless every character is in range.
pub fn encode_string(text: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for (index, ch) in text.chars().enumerate() {
        let c = u8::try_from(ch).map_err(|_| Error::EncodingRange { ch, index })?;
        out.push(c >> 4);
        out.push((c & 0x0F) << 4);
    }
    Ok(out)
}

/// Decode an encoded byte span
///
/// Any even-length input decodes; stray bits outside the two meaningful
/// nibbles are dropped, so every result character is in 0-255.
pub fn decode_string(bytes: &[u8]) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::MalformedString {
            offset: 0,
            len: bytes.len(),
        });
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| char::from((pair[0] << 4) | (pair[1] >> 4)))
        .collect())
}

/// Encoded size of `text` without encoding it
pub fn encoded_length(text: &str) -> usize {
    text.chars().count() * 2
}

/// A length-prefixed string field
///
/// Keeps the decoded text together with the exact bytes it came from, so a
/// field that is never edited is written back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodedString {
    text: String,
    raw: Vec<u8>,
}

impl EncodedString {
    pub fn new(text: &str) -> Result<Self> {
        Ok(Self {
            raw: encode_string(text)?,
            text: text.to_owned(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Encoded bytes, without the length prefix
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Value of the length prefix
    pub fn encoded_len(&self) -> usize {
        self.raw.len()
    }

    /// Replace the text; on failure the field is unchanged
    pub fn set(&mut self, text: &str) -> Result<()> {
        let raw = encode_string(text)?;
        self.raw = raw;
        self.text = text.to_owned();
        Ok(())
    }
}

impl Record for EncodedString {
    const MIN_LEN: usize = INT_LEN;

    fn parse(reader: &mut RecordReader<'_>) -> Result<Self> {
        let offset = reader.offset();
        let len = reader.read_count("string length")?;
        if len % 2 != 0 {
            return Err(Error::MalformedString { offset, len });
        }
        let raw = reader.read_bytes(len)?;
        let text = decode_string(raw)?;
        Ok(Self {
            text,
            raw: raw.to_vec(),
        })
    }

    fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        write_count(writer, "string length", self.raw.len())?;
        writer.write_all(&self.raw)?;
        Ok(())
    }

    fn byte_len(&self) -> usize {
        INT_LEN + self.raw.len()
    }
}

impl fmt::Display for EncodedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq<str> for EncodedString {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl Serialize for EncodedString {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_ab() {
        assert_eq!(encode_string("AB").unwrap(), vec![0x04, 0x10, 0x04, 0x20]);
    }

    #[test]
    fn test_decode_ab() {
        assert_eq!(decode_string(&[0x04, 0x10, 0x04, 0x20]).unwrap(), "AB");
    }

    #[test]
    fn test_empty_string() {
        assert!(encode_string("").unwrap().is_empty());
        assert_eq!(decode_string(&[]).unwrap(), "");
    }

    #[test]
    fn test_full_latin1_range_inverts() {
        let text: String = (0u8..=255).map(char::from).collect();
        let encoded = encode_string(&text).unwrap();

        assert_eq!(encoded.len(), 512);
        assert_eq!(decode_string(&encoded).unwrap(), text);
    }

    #[test]
    fn test_encode_out_of_range() {
        match encode_string("Caf\u{e9} \u{20ac}") {
            Err(Error::EncodingRange { ch, index }) => {
                assert_eq!(ch, '\u{20ac}');
                assert_eq!(index, 5);
            }
            other => panic!("expected range error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_odd_length() {
        assert!(matches!(
            decode_string(&[0x04, 0x10, 0x04]),
            Err(Error::MalformedString { len: 3, .. })
        ));
    }

    #[test]
    fn test_decode_arbitrary_bytes() {
        // High bits of the first byte and low bits of the second are dropped
        assert_eq!(decode_string(&[0xF4, 0x1F]).unwrap(), "A");
    }

    #[test]
    fn test_encoded_length() {
        assert_eq!(encoded_length(""), 0);
        assert_eq!(encoded_length("LOADS"), 10);
        assert_eq!(encoded_length("\u{e9}t\u{e9}"), 6);
    }

    #[test]
    fn test_field_parse_and_write() {
        let data = [0x04, 0x00, 0x00, 0x00, 0x04, 0x10, 0x04, 0x20];
        let field = EncodedString::from_bytes(&data).unwrap();

        assert_eq!(field.as_str(), "AB");
        assert_eq!(field.encoded_len(), 4);
        assert_eq!(field.byte_len(), 8);
        assert_eq!(field.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_field_keeps_raw_bytes() {
        // Not something encode would produce, but it must survive untouched
        let data = [0x02, 0x00, 0x00, 0x00, 0xF4, 0x1F];
        let field = EncodedString::from_bytes(&data).unwrap();

        assert_eq!(field.as_str(), "A");
        assert_eq!(field.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_field_odd_length_is_malformed() {
        let data = [0x03, 0x00, 0x00, 0x00, 0x04, 0x10, 0x04];
        assert!(matches!(
            EncodedString::from_bytes(&data),
            Err(Error::MalformedString { offset: 0, len: 3 })
        ));
    }

    #[test]
    fn test_field_truncated() {
        let data = [0x08, 0x00, 0x00, 0x00, 0x04, 0x10];
        assert!(matches!(
            EncodedString::from_bytes(&data),
            Err(Error::TruncatedInput { offset: 4, needed: 8, available: 2 })
        ));
    }

    #[test]
    fn test_failed_set_leaves_field_unchanged() {
        let mut field = EncodedString::new("MILL").unwrap();
        let before = field.clone();

        assert!(field.set("M\u{0100}LL").is_err());
        assert_eq!(field, before);

        field.set("Mill").unwrap();
        assert_eq!(field.encoded_len(), 2 * field.as_str().chars().count());
    }
}
