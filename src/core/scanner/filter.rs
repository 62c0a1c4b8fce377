//! File filtering for the directory walk.

use std::collections::HashSet;
use std::path::Path;

/// Filters walk entries down to supported image files
pub struct ExtensionFilter {
    /// Lowercased extensions to include
    extensions: HashSet<String>,
}

impl ExtensionFilter {
    /// Create a filter accepting the given extensions (case-insensitive)
    pub fn new(extensions: &[String]) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    /// Check if a file should be considered a candidate.
    ///
    /// Hidden files are always excluded; partially-written uploads and
    /// sidecar files conventionally start with a dot.
    pub fn should_include(&self, path: &Path) -> bool {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                return false;
            }
        }

        match self.extension_of(path) {
            Some(ext) => self.extensions.contains(&ext),
            None => false,
        }
    }

    /// The lowercased extension of a path, if any
    pub fn extension_of(&self, path: &Path) -> Option<String> {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}
