//! Industry records
//!
//! ```text
//! unknown1          : 4 raw bytes
//! name              : length-prefixed string
//! local_name        : length-prefixed string
//! symbol            : length-prefixed string
//! process_in_blocks : u8 bool
//! track_count       : i32
//! tracks            : TrackRecord * track_count
//! producer_count    : i32
//! producers         : ProducerRecord * producer_count
//! ```

use std::io::{Seek, Write};

use binrw::BinWriterExt;
use serde::Serialize;
use tracing::trace;

use crate::error::{Error, Result};
use crate::producer::ProducerRecord;
use crate::record::{write_count, write_seq, Flag, Record, RecordReader, BYTE_LEN, INT_LEN};
use crate::string::EncodedString;
use crate::track::TrackRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndustryRecord {
    /// Opaque, carried through unchanged
    pub unknown1: [u8; 4],
    name: EncodedString,
    local_name: EncodedString,
    symbol: EncodedString,
    pub process_in_blocks: Flag,
    tracks: Vec<TrackRecord>,
    producers: Vec<ProducerRecord>,
}

/// One row of the industry overview table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndustrySummary {
    pub name: String,
    pub symbol: String,
    pub local_name: String,
    pub track_count: usize,
    pub producer_count: usize,
    pub process_in_blocks: bool,
}

impl IndustryRecord {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn local_name(&self) -> &str {
        self.local_name.as_str()
    }

    pub fn symbol(&self) -> &str {
        self.symbol.as_str()
    }

    pub fn rename(&mut self, new_name: &str) -> Result<()> {
        self.name.set(new_name)
    }

    pub fn rename_local(&mut self, new_name: &str) -> Result<()> {
        self.local_name.set(new_name)
    }

    pub fn rename_symbol(&mut self, new_name: &str) -> Result<()> {
        self.symbol.set(new_name)
    }

    pub(crate) fn name_field_mut(&mut self) -> &mut EncodedString {
        &mut self.name
    }

    pub(crate) fn local_name_field_mut(&mut self) -> &mut EncodedString {
        &mut self.local_name
    }

    pub(crate) fn symbol_field_mut(&mut self) -> &mut EncodedString {
        &mut self.symbol
    }

    pub fn tracks(&self) -> &[TrackRecord] {
        &self.tracks
    }

    /// Replace the whole track list
    pub fn set_tracks(&mut self, tracks: Vec<TrackRecord>) {
        self.tracks = tracks;
    }

    pub fn producers(&self) -> &[ProducerRecord] {
        &self.producers
    }

    /// Producers can be edited in place but not added or removed
    pub fn producers_mut(&mut self) -> &mut [ProducerRecord] {
        &mut self.producers
    }

    pub fn producer_mut(&mut self, index: usize) -> Result<&mut ProducerRecord> {
        let len = self.producers.len();
        self.producers.get_mut(index).ok_or(Error::IndexOutOfRange {
            what: "producer",
            index,
            len,
        })
    }

    pub fn summary(&self) -> IndustrySummary {
        IndustrySummary {
            name: self.name().to_owned(),
            symbol: self.symbol().to_owned(),
            local_name: self.local_name().to_owned(),
            track_count: self.tracks.len(),
            producer_count: self.producers.len(),
            process_in_blocks: self.process_in_blocks.get(),
        }
    }
}

impl Record for IndustryRecord {
    // unknown1, three empty strings, the flag and both counts
    const MIN_LEN: usize = INT_LEN + 3 * EncodedString::MIN_LEN + BYTE_LEN + 2 * INT_LEN;

    fn parse(reader: &mut RecordReader<'_>) -> Result<Self> {
        let start = reader.offset();
        let unknown1 = reader.read_array()?;
        let name = EncodedString::parse(reader)?;
        let local_name = EncodedString::parse(reader)?;
        let symbol = EncodedString::parse(reader)?;
        let process_in_blocks = reader.read_flag()?;
        let track_count = reader.read_count("track count")?;
        let tracks = reader.read_seq(track_count)?;
        let producer_count = reader.read_count("producer count")?;
        let producers = reader.read_seq(producer_count)?;

        trace!(
            offset = start,
            len = reader.offset() - start,
            name = %name,
            tracks = track_count,
            producers = producer_count,
            "parsed industry"
        );

        Ok(Self {
            unknown1,
            name,
            local_name,
            symbol,
            process_in_blocks,
            tracks,
            producers,
        })
    }

    fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.unknown1)?;
        self.name.write_to(writer)?;
        self.local_name.write_to(writer)?;
        self.symbol.write_to(writer)?;
        writer.write_le(&self.process_in_blocks.raw())?;
        write_count(writer, "track count", self.tracks.len())?;
        write_seq(writer, &self.tracks)?;
        write_count(writer, "producer count", self.producers.len())?;
        write_seq(writer, &self.producers)?;
        Ok(())
    }

    fn byte_len(&self) -> usize {
        INT_LEN
            + self.name.byte_len()
            + self.local_name.byte_len()
            + self.symbol.byte_len()
            + BYTE_LEN
            + INT_LEN
            + self.tracks.len() * TrackRecord::SIZE
            + INT_LEN
            + self.producers.iter().map(|p| p.byte_len()).sum::<usize>()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::producer::tests::producer_bytes;
    use crate::string::encode_string;

    fn push_string(data: &mut Vec<u8>, text: &str) {
        let encoded = encode_string(text).unwrap();
        data.extend_from_slice(&(encoded.len() as i32).to_le_bytes());
        data.extend_from_slice(&encoded);
    }

    /// Raw industry bytes with one track and one producer per entry in `tags`
    pub(crate) fn industry_bytes(name: &str, local: &str, symbol: &str, tags: &[&[&str]]) -> Vec<u8> {
        let mut data = vec![0xDE, 0xAD, 0xBE, 0xEF];
        push_string(&mut data, name);
        push_string(&mut data, local);
        push_string(&mut data, symbol);
        data.push(1);
        data.extend_from_slice(&1i32.to_le_bytes());
        for v in [7i32, 100, 2001, 0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(&(tags.len() as i32).to_le_bytes());
        for (i, list) in tags.iter().enumerate() {
            data.extend(producer_bytes(1, i as u8, list, &[]));
        }
        data
    }

    #[test]
    fn test_industry_parse() {
        let data = industry_bytes("Acme Mill", "Acme", "ACM", &[&["LOADS"], &["EMPTY", "COAL"]]);
        let industry = IndustryRecord::from_bytes(&data).unwrap();

        assert_eq!(industry.unknown1, [0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(industry.name(), "Acme Mill");
        assert_eq!(industry.local_name(), "Acme");
        assert_eq!(industry.symbol(), "ACM");
        assert!(industry.process_in_blocks.get());
        assert_eq!(industry.tracks(), &[TrackRecord {
            unknown1: 7,
            route_prefix: 100,
            track_section: 2001,
            track_direction: 0,
        }]);
        assert_eq!(industry.producers().len(), 2);
        assert_eq!(industry.producers()[1].summarize_tags(), "EMPTY, COAL");
        assert_eq!(industry.byte_len(), data.len());
        assert_eq!(industry.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_rename_touches_only_name() {
        let data = industry_bytes("Acme Mill", "Acme", "ACM", &[&["LOADS"]]);
        let mut industry = IndustryRecord::from_bytes(&data).unwrap();

        industry.rename("Acme Flour Mill").unwrap();
        let bytes = industry.to_bytes().unwrap();

        assert_eq!(bytes.len(), data.len() + 12);
        assert_eq!(&bytes[4..8], &30i32.to_le_bytes());
        // Everything after the name is unchanged
        let old_tail = &data[4 + 4 + 18..];
        let new_tail = &bytes[4 + 4 + 30..];
        assert_eq!(old_tail, new_tail);

        let reparsed = IndustryRecord::from_bytes(&bytes).unwrap();
        assert_eq!(reparsed.name(), "Acme Flour Mill");
        assert_eq!(reparsed.local_name(), "Acme");
        assert_eq!(reparsed.symbol(), "ACM");
    }

    #[test]
    fn test_rename_local_and_symbol() {
        let data = industry_bytes("Acme Mill", "Acme", "ACM", &[]);
        let mut industry = IndustryRecord::from_bytes(&data).unwrap();

        industry.rename_local("").unwrap();
        industry.rename_symbol("AM2").unwrap();

        let reparsed = IndustryRecord::from_bytes(&industry.to_bytes().unwrap()).unwrap();
        assert_eq!(reparsed.name(), "Acme Mill");
        assert_eq!(reparsed.local_name(), "");
        assert_eq!(reparsed.symbol(), "AM2");
    }

    #[test]
    fn test_rename_out_of_range_leaves_record() {
        let data = industry_bytes("Acme Mill", "Acme", "ACM", &[]);
        let mut industry = IndustryRecord::from_bytes(&data).unwrap();

        assert!(matches!(
            industry.rename_symbol("\u{3042}"),
            Err(Error::EncodingRange { .. })
        ));
        assert_eq!(industry.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_set_tracks_updates_count() {
        let data = industry_bytes("Acme Mill", "Acme", "ACM", &[&["LOADS"]]);
        let mut industry = IndustryRecord::from_bytes(&data).unwrap();

        industry.set_tracks(vec![
            TrackRecord::new(100, 2001, 0),
            TrackRecord::new(100, 2002, 1),
            TrackRecord::new(101, 17, 0),
        ]);
        let bytes = industry.to_bytes().unwrap();
        assert_eq!(bytes.len(), data.len() + 32);

        let reparsed = IndustryRecord::from_bytes(&bytes).unwrap();
        assert_eq!(reparsed.tracks().len(), 3);
        assert_eq!(reparsed.tracks()[2].route_prefix, 101);
        assert_eq!(reparsed.tracks()[0].unknown1, 0);

        industry.set_tracks(Vec::new());
        let reparsed = IndustryRecord::from_bytes(&industry.to_bytes().unwrap()).unwrap();
        assert!(reparsed.tracks().is_empty());
        assert_eq!(reparsed.producers().len(), 1);
    }

    #[test]
    fn test_producer_edit_by_index() {
        let data = industry_bytes("Acme Mill", "Acme", "ACM", &[&["LOADS"], &["EMPTY"]]);
        let mut industry = IndustryRecord::from_bytes(&data).unwrap();

        let producer = industry.producer_mut(1).unwrap();
        producer.capacity = 40;
        producer.produce_empties.set(false);
        producer.add_tag("COAL").unwrap();

        assert!(matches!(
            industry.producer_mut(2),
            Err(Error::IndexOutOfRange { index: 2, len: 2, .. })
        ));

        let reparsed = IndustryRecord::from_bytes(&industry.to_bytes().unwrap()).unwrap();
        assert_eq!(reparsed.producers()[1].capacity, 40);
        assert!(!reparsed.producers()[1].produce_empties.get());
        assert_eq!(reparsed.producers()[1].summarize_tags(), "EMPTY, COAL");
        assert_eq!(reparsed.producers()[0], industry.producers()[0]);
    }

    #[test]
    fn test_summary() {
        let data = industry_bytes("Acme Mill", "Acme", "ACM", &[&["LOADS"], &[]]);
        let summary = IndustryRecord::from_bytes(&data).unwrap().summary();

        assert_eq!(summary.name, "Acme Mill");
        assert_eq!(summary.symbol, "ACM");
        assert_eq!(summary.track_count, 1);
        assert_eq!(summary.producer_count, 2);
        assert!(summary.process_in_blocks);
    }

    #[test]
    fn test_nonstandard_flag_byte_round_trips() {
        let mut data = industry_bytes("Acme Mill", "Acme", "ACM", &[&["LOADS"]]);
        let flag_at = 4 + (4 + 18) + (4 + 8) + (4 + 6);
        assert_eq!(data[flag_at], 1);
        data[flag_at] = 2;

        let mut industry = IndustryRecord::from_bytes(&data).unwrap();
        assert!(industry.process_in_blocks.get());
        assert_eq!(industry.to_bytes().unwrap(), data);

        industry.process_in_blocks.set(true);
        assert_eq!(industry.to_bytes().unwrap(), data);

        industry.process_in_blocks.set(false);
        assert_eq!(industry.to_bytes().unwrap()[flag_at], 0);
    }

    #[test]
    fn test_odd_name_length_is_malformed() {
        let mut data = industry_bytes("Acme", "A", "B", &[]);
        data[4..8].copy_from_slice(&7i32.to_le_bytes());

        assert!(matches!(
            IndustryRecord::from_bytes(&data),
            Err(Error::MalformedString { offset: 4, len: 7 })
        ));
    }
}
