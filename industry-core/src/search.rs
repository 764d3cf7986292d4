//! Exact-match find and replace across an industry file
//!
//! Matching is whole-field and case-sensitive. A tag search visits every tag
//! of every producer of every industry.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Result;
use crate::file::IndustryFile;
use crate::string::EncodedString;

/// Field a search runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Name,
    LocalName,
    Symbol,
    Tag,
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SearchField::Name),
            "local" | "local-name" | "local_name" => Ok(SearchField::LocalName),
            "symbol" => Ok(SearchField::Symbol),
            "tag" | "tags" => Ok(SearchField::Tag),
            other => Err(format!(
                "unknown field '{}' (expected name, local, symbol or tag)",
                other
            )),
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchField::Name => "name",
            SearchField::LocalName => "local name",
            SearchField::Symbol => "symbol",
            SearchField::Tag => "tag",
        };
        f.write_str(name)
    }
}

/// Location of one match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Match {
    Field { industry: usize },
    Tag { industry: usize, producer: usize, tag: usize },
}

impl Match {
    pub fn industry(&self) -> usize {
        match *self {
            Match::Field { industry } | Match::Tag { industry, .. } => industry,
        }
    }
}

/// Outcome of a replace-all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReplaceReport {
    /// Fields rewritten or tags rewritten/deleted
    pub occurrences: usize,
    /// Distinct industries touched
    pub industries: usize,
    /// True when tags were deleted rather than renamed
    pub deleted: bool,
}

/// Every exact match of `text` in `field`. Empty text matches nothing.
pub fn find(file: &IndustryFile, field: SearchField, text: &str) -> Vec<Match> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for (i, industry) in file.industries.iter().enumerate() {
        let value = match field {
            SearchField::Name => industry.name(),
            SearchField::LocalName => industry.local_name(),
            SearchField::Symbol => industry.symbol(),
            SearchField::Tag => {
                for (p, producer) in industry.producers().iter().enumerate() {
                    for (t, tag) in producer.tags().iter().enumerate() {
                        if tag.name() == text {
                            matches.push(Match::Tag {
                                industry: i,
                                producer: p,
                                tag: t,
                            });
                        }
                    }
                }
                continue;
            }
        };
        if value == text {
            matches.push(Match::Field { industry: i });
        }
    }
    matches
}

/// Replace every exact match of `find_text` in `field` with `replacement`
///
/// For tags a blank replacement deletes the matching tags. The replacement is
/// encoded before anything is touched, so an encoding failure leaves the file
/// as it was.
pub fn replace_all(
    file: &mut IndustryFile,
    field: SearchField,
    find_text: &str,
    replacement: &str,
) -> Result<ReplaceReport> {
    let matches = find(file, field, find_text);
    if matches.is_empty() {
        return Ok(ReplaceReport::default());
    }

    let industries: BTreeSet<usize> = matches.iter().map(Match::industry).collect();
    let delete = field == SearchField::Tag && replacement.trim().is_empty();
    let encoded = if delete {
        EncodedString::default()
    } else {
        EncodedString::new(replacement)?
    };

    let mut occurrences = 0;
    for &i in &industries {
        let industry = &mut file.industries[i];
        match field {
            SearchField::Name => {
                *industry.name_field_mut() = encoded.clone();
                occurrences += 1;
            }
            SearchField::LocalName => {
                *industry.local_name_field_mut() = encoded.clone();
                occurrences += 1;
            }
            SearchField::Symbol => {
                *industry.symbol_field_mut() = encoded.clone();
                occurrences += 1;
            }
            SearchField::Tag => {
                for producer in industry.producers_mut() {
                    occurrences += if delete {
                        producer.delete_all_tags(find_text)
                    } else {
                        producer.rename_all_tags(find_text, &encoded)
                    };
                }
            }
        }
    }

    Ok(ReplaceReport {
        occurrences,
        industries: industries.len(),
        deleted: delete,
    })
}
