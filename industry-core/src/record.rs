//! Record framing shared by every industry file structure
//!
//! Records carry no offsets or index. Each one is parsed from a
//! [`RecordReader`] positioned at its first byte and leaves the reader on the
//! first byte of its next sibling. Serialization is the mirror image: a record
//! writes its fields in the same order and [`Record::byte_len`] reports exactly
//! how many bytes both directions touch.

use std::io::{Cursor, Seek, Write};

use binrw::BinWriterExt;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Size of every integer field on disk
pub const INT_LEN: usize = 4;

/// Size of every boolean / byte field on disk
pub const BYTE_LEN: usize = 1;

/// Bounds-checked little-endian cursor over an in-memory buffer
#[derive(Debug, Clone)]
pub struct RecordReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Start reading at `offset` within `buf`
    pub fn at(buf: &'a [u8], offset: usize) -> Self {
        Self { buf, pos: offset }
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consume `n` bytes, failing before any out-of-bounds access
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if n > available {
            return Err(Error::TruncatedInput {
                offset: self.pos,
                needed: n,
                available,
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(BYTE_LEN)?[0])
    }

    /// Any nonzero byte reads as true
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_flag(&mut self) -> Result<Flag> {
        Ok(Flag(self.read_u8()?))
    }

    /// Read a signed count or length field. Negative values are rejected.
    pub fn read_count(&mut self, field: &'static str) -> Result<usize> {
        let offset = self.pos;
        let count = self.read_i32()?;
        usize::try_from(count).map_err(|_| Error::InvalidCount {
            offset,
            field,
            count,
        })
    }

    /// Parse `count` records laid end to end
    pub fn read_seq<T: Record>(&mut self, count: usize) -> Result<Vec<T>> {
        // Never reserve more records than the remaining bytes could hold
        let fits = self.remaining() / T::MIN_LEN.max(1);
        let mut items = Vec::with_capacity(count.min(fits));
        for _ in 0..count {
            items.push(T::parse(self)?);
        }
        Ok(items)
    }
}

/// A structure with a fixed field order and a self-derived length
pub trait Record: Sized {
    /// Smallest possible encoding of the record
    const MIN_LEN: usize;

    /// Parse one record starting at the reader's current offset
    fn parse(reader: &mut RecordReader<'_>) -> Result<Self>;

    /// Write the record's fields in on-disk order
    fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<()>;

    /// Bytes consumed by `parse` and produced by `write_to`
    fn byte_len(&self) -> usize;

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::parse(&mut RecordReader::new(bytes))
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(self.byte_len()));
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}

/// A one-byte boolean that keeps the byte it was read from
///
/// Any nonzero byte is true. The stored byte only changes when the value
/// does, so an untouched flag holding e.g. `2` is written back as `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flag(u8);

impl Flag {
    pub fn get(self) -> bool {
        self.0 != 0
    }

    pub fn set(&mut self, value: bool) {
        if self.get() != value {
            self.0 = u8::from(value);
        }
    }

    /// Byte written to disk
    pub fn raw(self) -> u8 {
        self.0
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        Flag(u8::from(value))
    }
}

impl Serialize for Flag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.get())
    }
}

/// Write an array length as the i32 count that precedes it
pub fn write_count<W: Write + Seek>(writer: &mut W, field: &'static str, len: usize) -> Result<()> {
    let count = i32::try_from(len)
        .map_err(|_| Error::BinRw(format!("{} {} does not fit in an i32", field, len)))?;
    writer.write_le(&count)?;
    Ok(())
}

/// Write each record back to back with no framing
pub fn write_seq<W: Write + Seek, T: Record>(writer: &mut W, items: &[T]) -> Result<()> {
    for item in items {
        item.write_to(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [0x01, 0x00, 0x00, 0x00, 0xFF, 0x02, 0x00];
        let mut reader = RecordReader::new(&data);

        assert_eq!(reader.read_i32().unwrap(), 1);
        assert_eq!(reader.read_u8().unwrap(), 0xFF);
        assert!(reader.read_bool().unwrap());
        assert!(!reader.read_bool().unwrap());
        assert!(reader.is_empty());
    }

    #[test]
    fn test_truncated_read_reports_position() {
        let data = [0u8; 6];
        let mut reader = RecordReader::at(&data, 4);

        match reader.read_i32() {
            Err(Error::TruncatedInput { offset, needed, available }) => {
                assert_eq!(offset, 4);
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
        // A failed read does not move the cursor
        assert_eq!(reader.offset(), 4);
    }

    #[test]
    fn test_negative_count_rejected() {
        let data = (-1i32).to_le_bytes();
        let mut reader = RecordReader::new(&data);

        assert!(matches!(
            reader.read_count("tag count"),
            Err(Error::InvalidCount { offset: 0, count: -1, .. })
        ));
    }

    #[test]
    fn test_huge_count_fails_without_allocating() {
        let data = [0u8; 8];
        let mut reader = RecordReader::new(&data);

        let result: Result<Vec<crate::track::TrackRecord>> = reader.read_seq(usize::MAX / 2);
        assert!(matches!(result, Err(Error::TruncatedInput { .. })));
    }

    #[test]
    fn test_huge_count_on_large_buffer() {
        // Zeroed industries parse (empty strings, no tracks or producers), so
        // the count runs out of bytes rather than hitting a bad field
        let mut data = vec![0u8; 16 * 1024 * 1024];
        data[4..8].copy_from_slice(&i32::MAX.to_le_bytes());

        assert!(matches!(
            crate::file::IndustryFile::parse(&data),
            Err(Error::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_flag_keeps_raw_byte() {
        let data = [0x02, 0x00];
        let mut reader = RecordReader::new(&data);
        let mut set = reader.read_flag().unwrap();
        let mut clear = reader.read_flag().unwrap();

        assert!(set.get());
        assert!(!clear.get());

        set.set(true);
        assert_eq!(set.raw(), 2);
        set.set(false);
        assert_eq!(set.raw(), 0);
        clear.set(true);
        assert_eq!(clear.raw(), 1);
        assert_eq!(Flag::from(true), clear);
    }
}
