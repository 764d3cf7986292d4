//! Tag and filter leaf records
//!
//! Both are nothing more than a length-prefixed encoded string. They are kept
//! as separate types because producers use them for different things: tags
//! name the cars an industry processes, filters restrict where they go.

use std::io::{Seek, Write};

use serde::Serialize;

use crate::error::Result;
use crate::record::{Record, RecordReader};
use crate::string::EncodedString;

macro_rules! name_record {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
        #[serde(transparent)]
        pub struct $name {
            name: EncodedString,
        }

        impl $name {
            /// Build a new record, validating the encoding range
            pub fn new(name: &str) -> Result<Self> {
                Ok(Self {
                    name: EncodedString::new(name)?,
                })
            }

            pub fn name(&self) -> &str {
                self.name.as_str()
            }

            pub fn encoded(&self) -> &EncodedString {
                &self.name
            }

            /// Rewrite the name; on failure the record is unchanged
            pub fn rename(&mut self, name: &str) -> Result<()> {
                self.name.set(name)
            }
        }

        impl Record for $name {
            const MIN_LEN: usize = EncodedString::MIN_LEN;

            fn parse(reader: &mut RecordReader<'_>) -> Result<Self> {
                Ok(Self {
                    name: EncodedString::parse(reader)?,
                })
            }

            fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
                self.name.write_to(writer)
            }

            fn byte_len(&self) -> usize {
                self.name.byte_len()
            }
        }
    };
}

name_record!(
    /// A car tag an industry producer processes
    TagRecord
);

name_record!(
    /// A producer filter entry
    FilterRecord
);

impl TagRecord {
    /// Take over a name encoded once for many tags
    pub(crate) fn set_encoded(&mut self, name: EncodedString) {
        self.name = name;
    }
}
