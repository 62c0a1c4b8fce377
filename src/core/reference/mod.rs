//! # Reference Module
//!
//! Builds the live-reference baseline from the system of record.
//!
//! The engine never talks to a database driver directly; it consumes the
//! [`DocumentStore`] capability and extracts image filenames from a fixed
//! table of (collection, fields) pairs. The resulting [`ReferenceSet`] is
//! built once per run and read-only afterward.
//!
//! A failed store is fatal for the whole run: without a baseline, any
//! deletion could hit a referenced file.

mod scanner;
mod store;

pub use scanner::{ReferenceScanner, COLLECTION_FIELDS};
pub use store::{Document, DocumentStore, JsonFileStore, UnreachableStore};

use std::collections::HashSet;
use std::path::Path;

/// The set of basenames known to be in use, case preserved as stored
#[derive(Debug, Default, Clone)]
pub struct ReferenceSet {
    names: HashSet<String>,
}

impl ReferenceSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a basename as referenced
    pub fn insert(&mut self, basename: String) {
        self.names.insert(basename);
    }

    /// Check whether a basename is referenced
    pub fn contains(&self, basename: &str) -> bool {
        self.names.contains(basename)
    }

    /// Check whether a path's basename is referenced
    pub fn contains_basename(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| self.names.contains(name))
            .unwrap_or(false)
    }

    /// Number of distinct referenced basenames
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if no references were found
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
