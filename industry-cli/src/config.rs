//! CLI configuration

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Industry file being read
    pub input: PathBuf,
    /// Where edits are written; `None` means in place
    pub output: Option<PathBuf>,
    /// Headerless `id,name` CSV of car type names
    pub car_types: Option<PathBuf>,
    /// Copy the old file to `<name>.bak` before overwriting it
    pub backup: bool,
    /// Print results as JSON instead of text
    pub json: bool,
    pub verbose: bool,
}

impl Config {
    /// Path edits are saved to
    pub fn target(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.input)
    }

    /// True when the target is the input file, however either is spelled
    pub fn in_place(&self) -> bool {
        match (fs::canonicalize(&self.input), fs::canonicalize(self.target())) {
            (Ok(input), Ok(target)) => input == target,
            _ => self.target() == self.input,
        }
    }
}
