//! Industry track connections
//!
//! A track record ties an industry to one spot on the route. It is a fixed
//! 16-byte structure with no strings:
//!
//! | Offset | Field           |
//! |--------|-----------------|
//! | 0      | unknown1        |
//! | 4      | route_prefix    |
//! | 8      | track_section   |
//! | 12     | track_direction |

use std::io::{Cursor, Seek, Write};

use binrw::{binrw, BinRead, BinWrite};
use serde::Serialize;

use crate::error::Result;
use crate::record::{Record, RecordReader, INT_LEN};

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TrackRecord {
    /// Opaque, carried through unchanged (zero for new tracks)
    pub unknown1: i32,
    pub route_prefix: i32,
    pub track_section: i32,
    pub track_direction: i32,
}

impl TrackRecord {
    pub const SIZE: usize = 4 * INT_LEN;

    /// A user-added track; the opaque field defaults to zero
    pub fn new(route_prefix: i32, track_section: i32, track_direction: i32) -> Self {
        Self {
            unknown1: 0,
            route_prefix,
            track_section,
            track_direction,
        }
    }
}

impl Record for TrackRecord {
    const MIN_LEN: usize = Self::SIZE;

    fn parse(reader: &mut RecordReader<'_>) -> Result<Self> {
        // Bounds are checked by the reader, so binrw never sees a short buffer
        let bytes = reader.read_bytes(Self::SIZE)?;
        Ok(<Self as BinRead>::read(&mut Cursor::new(bytes))?)
    }

    fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        <Self as BinWrite>::write(self, writer)?;
        Ok(())
    }

    fn byte_len(&self) -> usize {
        Self::SIZE
    }
}
