//! industry-core: reader/writer for simulator industry (.ind) files
//!
//! This crate provides:
//! - The nibble-swapped string codec used for every text field
//! - The record tree: file -> industries -> tracks / producers -> tags / filters
//! - Byte-exact serialization, preserving fields whose meaning is unknown
//! - Exact-match find/replace and car type name lookup for editors
//!
//! Everything operates on in-memory buffers; callers do the file I/O.

pub mod car_types;
pub mod error;
pub mod file;
pub mod industry;
pub mod producer;
pub mod record;
pub mod search;
pub mod string;
pub mod tag;
pub mod track;

pub use car_types::CarTypes;
pub use error::{Error, Result};
pub use file::IndustryFile;
pub use industry::{IndustryRecord, IndustrySummary};
pub use producer::ProducerRecord;
pub use record::{Flag, Record, RecordReader};
pub use search::{Match, ReplaceReport, SearchField};
pub use string::{decode_string, encode_string, EncodedString};
pub use tag::{FilterRecord, TagRecord};
pub use track::TrackRecord;
