//! Loading and saving industry files
//!
//! The hash of the bytes read is kept so an in-place save can tell whether
//! something else rewrote the file in the meantime.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tracing::{debug, info};
use xxhash_rust::xxh3::xxh3_64;

use industry_core::IndustryFile;

use crate::config::Config;

pub struct LoadedFile {
    pub path: PathBuf,
    pub file: IndustryFile,
    /// xxh3 of the bytes as read
    hash: u64,
    /// Bytes after the last industry, dropped on save
    trailing: usize,
}

impl LoadedFile {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = fs::read(&path).with_context(|| format!("Cannot read {:?}", path))?;
        let (file, consumed) = IndustryFile::parse_prefix(&data)
            .with_context(|| format!("Cannot parse {:?}", path))?;

        debug!(
            "Loaded {:?}: {} industries, {} bytes",
            path,
            file.industries.len(),
            data.len()
        );

        Ok(Self {
            path,
            file,
            hash: xxh3_64(&data),
            trailing: data.len() - consumed,
        })
    }

    /// Number of bytes after the last industry record
    pub fn trailing_bytes(&self) -> usize {
        self.trailing
    }

    /// Serialize to `config.target()`, returning the number of bytes written
    pub fn save(&self, config: &Config) -> anyhow::Result<usize> {
        let target = config.target();
        let data = self.file.serialize().context("Cannot serialize industry file")?;

        if target.exists() {
            if config.in_place() {
                self.check_unchanged()?;
            }
            if config.backup {
                let backup = backup_path(target);
                fs::copy(target, &backup)
                    .with_context(|| format!("Cannot back up {:?} to {:?}", target, backup))?;
                info!("Backed up {:?} to {:?}", target, backup);
            }
        }

        let out = File::create(target).with_context(|| format!("Cannot create {:?}", target))?;
        let mut writer = BufWriter::new(out);
        writer.write_all(&data)?;
        writer.flush()?;

        info!("Wrote {:?} ({} bytes, {} industries)", target, data.len(), self.file.industries.len());
        Ok(data.len())
    }

    fn check_unchanged(&self) -> anyhow::Result<()> {
        let current = fs::read(&self.path).with_context(|| format!("Cannot re-read {:?}", self.path))?;
        if xxh3_64(&current) != self.hash {
            bail!("{:?} changed on disk since it was loaded; not overwriting", self.path);
        }
        Ok(())
    }
}

/// `route.ind` -> `route.ind.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}
