//! Industry (.ind) file container
//!
//! An 8-byte header followed by the industry records back to back. There is
//! no magic number, version or checksum; the header is:
//!
//! | Offset | Field        |
//! |--------|--------------|
//! | 0      | unknown1     |
//! | 4      | record_count |

use std::io::{Cursor, Seek, Write};

use binrw::{binrw, BinRead, BinWrite};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::industry::{IndustryRecord, IndustrySummary};
use crate::record::{write_seq, Record, RecordReader, INT_LEN};

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct FileHeader {
    unknown1: [u8; 4],
    record_count: i32,
}

impl FileHeader {
    const SIZE: usize = 2 * INT_LEN;
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IndustryFile {
    /// Opaque, carried through unchanged
    pub unknown1: [u8; 4],
    /// Count as read from disk. Ignored on write: the real number of
    /// industries is always written instead.
    pub record_count: i32,
    pub industries: Vec<IndustryRecord>,
}

impl IndustryFile {
    /// Parse a complete file. Bytes after the last industry are ignored.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let (file, consumed) = Self::parse_prefix(buf)?;
        if consumed < buf.len() {
            debug!(trailing = buf.len() - consumed, "ignoring bytes after last industry");
        }
        Ok(file)
    }

    /// Parse a file and report how many bytes it occupied
    pub fn parse_prefix(buf: &[u8]) -> Result<(Self, usize)> {
        let mut reader = RecordReader::new(buf);
        let file = <Self as Record>::parse(&mut reader)?;
        Ok((file, reader.offset()))
    }

    /// Serialize with `record_count` recomputed from the industry list
    pub fn serialize(&self) -> Result<Vec<u8>> {
        self.to_bytes()
    }

    pub fn industry(&self, index: usize) -> Result<&IndustryRecord> {
        self.industries.get(index).ok_or(Error::IndexOutOfRange {
            what: "industry",
            index,
            len: self.industries.len(),
        })
    }

    pub fn industry_mut(&mut self, index: usize) -> Result<&mut IndustryRecord> {
        let len = self.industries.len();
        self.industries.get_mut(index).ok_or(Error::IndexOutOfRange {
            what: "industry",
            index,
            len,
        })
    }

    pub fn summaries(&self) -> Vec<IndustrySummary> {
        self.industries.iter().map(IndustryRecord::summary).collect()
    }

    /// Industries with their file indices, ordered case-insensitively by
    /// name. Ties keep file order.
    pub fn sorted_by_name(&self) -> Vec<(usize, &IndustryRecord)> {
        let mut sorted: Vec<_> = self.industries.iter().enumerate().collect();
        sorted.sort_by_cached_key(|(_, industry)| industry.name().to_lowercase());
        sorted
    }
}

impl Record for IndustryFile {
    const MIN_LEN: usize = FileHeader::SIZE;

    fn parse(reader: &mut RecordReader<'_>) -> Result<Self> {
        let start = reader.offset();
        let header_bytes = reader.read_bytes(FileHeader::SIZE)?;
        let header = <FileHeader as BinRead>::read(&mut Cursor::new(header_bytes))?;
        let record_count = usize::try_from(header.record_count).map_err(|_| Error::InvalidCount {
            offset: start + INT_LEN,
            field: "record count",
            count: header.record_count,
        })?;

        let industries = reader.read_seq(record_count)?;
        debug!(
            industries = industries.len(),
            bytes = reader.offset(),
            "parsed industry file"
        );

        Ok(Self {
            unknown1: header.unknown1,
            record_count: header.record_count,
            industries,
        })
    }

    fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        let record_count = i32::try_from(self.industries.len()).map_err(|_| {
            Error::BinRw(format!("{} industries do not fit in an i32", self.industries.len()))
        })?;
        let header = FileHeader {
            unknown1: self.unknown1,
            record_count,
        };
        <FileHeader as BinWrite>::write(&header, writer)?;
        write_seq(writer, &self.industries)?;
        debug!(industries = self.industries.len(), bytes = self.byte_len(), "serialized industry file");
        Ok(())
    }

    fn byte_len(&self) -> usize {
        FileHeader::SIZE + self.industries.iter().map(|i| i.byte_len()).sum::<usize>()
    }
}
