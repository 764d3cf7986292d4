//! Car type names for producer `car_type_id` values
//!
//! The simulator ships the table as a headerless CSV of `id,name` rows.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::producer::ProducerRecord;

/// Name shown for ids missing from the table
pub const UNKNOWN_CAR_TYPE: &str = "Unknown";

#[derive(Debug, Clone, Default)]
pub struct CarTypes {
    names: HashMap<u8, String>,
}

impl CarTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Read `id,name` rows. Extra columns are ignored, a repeated id keeps
    /// the last name.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut names = HashMap::new();
        for (line, row) in csv.records().enumerate() {
            let row = row?;
            let id = row.get(0).unwrap_or_default();
            let name = row.get(1).ok_or_else(|| {
                Error::CarTypes(format!("line {}: missing car type name", line + 1))
            })?;
            let id: u8 = id.parse().map_err(|_| {
                Error::CarTypes(format!("line {}: invalid car type id '{}'", line + 1, id))
            })?;
            names.insert(id, name.to_owned());
        }
        Ok(Self { names })
    }

    pub fn name(&self, id: u8) -> &str {
        self.names.get(&id).map(String::as_str).unwrap_or(UNKNOWN_CAR_TYPE)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Producers with their original indices, ordered case-insensitively by
    /// car type name. Ties keep file order.
    pub fn sort_producers<'a>(&self, producers: &'a [ProducerRecord]) -> Vec<(usize, &'a ProducerRecord)> {
        let mut sorted: Vec<_> = producers.iter().enumerate().collect();
        sorted.sort_by_cached_key(|(_, p)| self.name(p.car_type_id).to_lowercase());
        sorted
    }
}
