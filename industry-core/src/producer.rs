//! Producer (production rule) records
//!
//! A producer describes one car type an industry handles:
//!
//! ```text
//! record_kind     : i32   opaque, observed as 1 (no filters) or 2 (filters)
//! car_type_id     : u8
//! produce_empties : u8    bool
//! process_hours   : i32
//! capacity        : i32
//! tag_count       : i32
//! tags            : TagRecord * tag_count
//! filter_count    : i32
//! filters         : FilterRecord * filter_count
//! ```
//!
//! `record_kind` is never recomputed from the filter list.

use std::io::{Seek, Write};

use binrw::BinWriterExt;
use serde::Serialize;

use crate::error::Result;
use crate::record::{write_count, write_seq, Flag, Record, RecordReader, BYTE_LEN, INT_LEN};
use crate::string::EncodedString;
use crate::tag::{FilterRecord, TagRecord};

/// Size of the fixed fields, count fields included
const FIXED_LEN: usize = INT_LEN + BYTE_LEN + BYTE_LEN + INT_LEN * 3 + INT_LEN;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProducerRecord {
    pub record_kind: i32,
    pub car_type_id: u8,
    pub produce_empties: Flag,
    pub process_hours: i32,
    pub capacity: i32,
    tags: Vec<TagRecord>,
    filters: Vec<FilterRecord>,
}

impl ProducerRecord {
    pub fn tags(&self) -> &[TagRecord] {
        &self.tags
    }

    pub fn filters(&self) -> &[FilterRecord] {
        &self.filters
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name() == name)
    }

    /// Append a tag. Duplicate names are allowed.
    pub fn add_tag(&mut self, name: &str) -> Result<()> {
        self.tags.push(TagRecord::new(name)?);
        Ok(())
    }

    /// Remove the first tag named exactly `name`; returns whether one was removed
    pub fn delete_tag(&mut self, name: &str) -> bool {
        match self.tags.iter().position(|t| t.name() == name) {
            Some(i) => {
                self.tags.remove(i);
                true
            }
            None => false,
        }
    }

    /// Remove every tag named exactly `name`; returns how many were removed
    pub fn delete_all_tags(&mut self, name: &str) -> usize {
        let before = self.tags.len();
        self.tags.retain(|t| t.name() != name);
        before - self.tags.len()
    }

    /// Rewrite the first tag named `old_name`. An empty `new_name` deletes it.
    ///
    /// Returns whether a tag was touched. An unencodable `new_name` fails and
    /// leaves the tags as they were.
    pub fn replace_tag(&mut self, old_name: &str, new_name: &str) -> Result<bool> {
        if new_name.is_empty() {
            return Ok(self.delete_tag(old_name));
        }
        match self.tags.iter_mut().find(|t| t.name() == old_name) {
            Some(tag) => {
                tag.rename(new_name)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Tag names joined with ", " in array order
    pub fn summarize_tags(&self) -> String {
        self.tags
            .iter()
            .map(TagRecord::name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Rebuild the tag array from free text separated by commas and/or whitespace
    ///
    /// Every name is encoded before the old tags are dropped.
    pub fn set_tags_from_list(&mut self, text: &str) -> Result<()> {
        let tags = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|name| !name.is_empty())
            .map(TagRecord::new)
            .collect::<Result<Vec<_>>>()?;
        self.tags = tags;
        Ok(())
    }

    /// Overwrite every tag named `name` with an already-encoded value
    pub(crate) fn rename_all_tags(&mut self, name: &str, replacement: &EncodedString) -> usize {
        let mut count = 0;
        for tag in self.tags.iter_mut().filter(|t| t.name() == name) {
            tag.set_encoded(replacement.clone());
            count += 1;
        }
        count
    }
}

impl Record for ProducerRecord {
    const MIN_LEN: usize = FIXED_LEN;

    fn parse(reader: &mut RecordReader<'_>) -> Result<Self> {
        let record_kind = reader.read_i32()?;
        let car_type_id = reader.read_u8()?;
        let produce_empties = reader.read_flag()?;
        let process_hours = reader.read_i32()?;
        let capacity = reader.read_i32()?;
        let tag_count = reader.read_count("tag count")?;
        let tags = reader.read_seq(tag_count)?;
        let filter_count = reader.read_count("filter count")?;
        let filters = reader.read_seq(filter_count)?;

        Ok(Self {
            record_kind,
            car_type_id,
            produce_empties,
            process_hours,
            capacity,
            tags,
            filters,
        })
    }

    fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        writer.write_le(&self.record_kind)?;
        writer.write_le(&self.car_type_id)?;
        writer.write_le(&self.produce_empties.raw())?;
        writer.write_le(&self.process_hours)?;
        writer.write_le(&self.capacity)?;
        write_count(writer, "tag count", self.tags.len())?;
        write_seq(writer, &self.tags)?;
        write_count(writer, "filter count", self.filters.len())?;
        write_seq(writer, &self.filters)?;
        Ok(())
    }

    fn byte_len(&self) -> usize {
        FIXED_LEN
            + self.tags.iter().map(|t| t.byte_len()).sum::<usize>()
            + self.filters.iter().map(|f| f.byte_len()).sum::<usize>()
    }
}
