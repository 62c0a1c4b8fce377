//! # Scanner Module
//!
//! Discovers candidate image files in the configured directories.
//!
//! Every candidate carries a `seq` number capturing its directory-walk
//! discovery order. Duplicate retention is defined in terms of `seq`, so it
//! is assigned here, before any parallel phase, and never changes.

mod filter;
mod walker;

pub use filter::ExtensionFilter;
pub use walker::DirectoryScanner;

use crate::error::ScanError;
use std::path::PathBuf;
use std::time::SystemTime;

/// Represents one file under consideration
#[derive(Debug, Clone)]
pub struct CandidateFile {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size_bytes: u64,
    /// Last modified time
    pub modified: SystemTime,
    /// Lowercased extension, without the dot
    pub extension: String,
    /// Discovery order within the walk; lower = found earlier
    pub seq: usize,
}

impl CandidateFile {
    /// Age of the file in whole days, measured from its mtime.
    ///
    /// Files with an mtime in the future count as age zero.
    pub fn age_days(&self, now: SystemTime) -> i64 {
        match now.duration_since(self.modified) {
            Ok(elapsed) => (elapsed.as_secs() / 86_400) as i64,
            Err(_) => 0,
        }
    }

    /// The file's basename, as stored on disk.
    pub fn basename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Result of a directory walk
#[derive(Debug)]
pub struct ScanOutcome {
    /// Discovered candidates, in walk order
    pub files: Vec<CandidateFile>,
    /// Non-fatal errors encountered along the way
    pub errors: Vec<ScanError>,
}
