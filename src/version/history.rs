//! Flat-file ledger of downloaded versions
//!
//! Each downloaded version is one line of the form `"<version> \n"`. The
//! trailing space is part of the format: [`DownloadHistory::contains`] only
//! matches lines written by [`DownloadHistory::append`], so existing ledgers
//! stay readable. Lines ending in `\r\n` match as well.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;
use tracing::debug;

use crate::event::Event;
use crate::version::error::HistoryError;

/// Trait for recording which versions were already downloaded
#[cfg_attr(test, automock)]
pub trait DownloadHistory: Send + Sync {
    /// Whether history tracking was initialized
    fn exists(&self) -> bool;

    /// Start an empty history. Only called when [`exists`](Self::exists) is false.
    fn initialize(&self) -> Result<(), HistoryError>;

    /// Check whether a version was recorded
    fn contains(&self, version: &str) -> Result<bool, HistoryError>;

    /// Record a version. Does not deduplicate.
    fn append(&self, version: &str) -> Result<(), HistoryError>;
}

pub struct HistoryFile {
    path: PathBuf,
}

impl HistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn entry(version: &str) -> String {
        format!("{version} \n")
    }

    fn io_error(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl DownloadHistory for HistoryFile {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn initialize(&self) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        File::create(&self.path).map_err(|e| self.io_error(e))?;
        Event::HistoryInitialized {
            path: self.path.clone(),
        }
        .emit();
        Ok(())
    }

    fn contains(&self, version: &str) -> Result<bool, HistoryError> {
        let expected = format!("{version} ");
        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let mut reader = BufReader::new(file);
        let mut line = String::new();

        loop {
            line.clear();
            // read_line keeps the newline, so an unterminated last line never matches
            if reader.read_line(&mut line).map_err(|e| self.io_error(e))? == 0 {
                return Ok(false);
            }
            let content = line
                .strip_suffix('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l));
            if content == Some(expected.as_str()) {
                return Ok(true);
            }
        }
    }

    fn append(&self, version: &str) -> Result<(), HistoryError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(Self::entry(version).as_bytes())
            .map_err(|e| self.io_error(e))?;
        debug!("Appended {} to {:?}", version, self.path);
        Ok(())
    }
}
