//! Immutable configuration for a sweep run.
//!
//! Loaded once (defaults, optionally a JSON file, then CLI overrides) and
//! never mutated afterward.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Parameters controlling a sweep run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Root directories to walk for candidate files
    pub image_dirs: Vec<PathBuf>,
    /// Holding directory for relocated files
    pub quarantine_dir: PathBuf,
    /// File extensions considered images (lowercase, no dot)
    pub allowed_extensions: Vec<String>,
    /// Inclusive lower size bound; smaller files are never touched
    pub min_file_size_bytes: u64,
    /// Inclusive upper size bound; larger files are never touched
    pub max_file_size_bytes: u64,
    /// Minimum of width/height an image must decode to
    pub min_dimension_px: u32,
    /// Grace period: unreferenced files younger than this are kept
    pub min_age_days: i64,
    /// Perceptual hash edge length (hash is size x size bits)
    pub hash_size: u32,
    /// Worker pool size for the parallel phases (0 = library default)
    pub max_workers: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            image_dirs: Vec::new(),
            quarantine_dir: PathBuf::from("quarantine"),
            allowed_extensions: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "gif".to_string(),
                "bmp".to_string(),
                "tiff".to_string(),
                "tif".to_string(),
            ],
            min_file_size_bytes: 1,
            max_file_size_bytes: 50 * 1024 * 1024,
            min_dimension_px: 32,
            min_age_days: 30,
            hash_size: 8,
            max_workers: 0,
        }
    }
}

impl SweepConfig {
    /// Load configuration from a JSON file, filling unset fields with
    /// defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|e| ConfigError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Check invariants that must hold before any scan starts.
    ///
    /// Violations here are fatal; the run aborts with no filesystem
    /// mutation attempted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_dirs.is_empty() {
            return Err(ConfigError::NoImageDirs);
        }

        for dir in &self.image_dirs {
            if !dir.is_dir() {
                return Err(ConfigError::ImageDirNotFound { path: dir.clone() });
            }
        }

        if self.min_file_size_bytes > self.max_file_size_bytes {
            return Err(ConfigError::InvalidSizeBounds {
                min: self.min_file_size_bytes,
                max: self.max_file_size_bytes,
            });
        }

        if !(4..=32).contains(&self.hash_size) {
            return Err(ConfigError::InvalidHashSize {
                value: self.hash_size,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_safe() {
        let config = SweepConfig::default();
        assert_eq!(config.min_age_days, 30);
        assert_eq!(config.hash_size, 8);
        assert!(config.allowed_extensions.contains(&"jpg".to_string()));
    }

    #[test]
    fn validate_rejects_empty_dirs() {
        let config = SweepConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::NoImageDirs)));
    }

    #[test]
    fn validate_rejects_missing_dir() {
        let config = SweepConfig {
            image_dirs: vec![PathBuf::from("/nonexistent/uploads/12345")],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ImageDirNotFound { .. })
        ));
    }

    #[test]
    fn validate_rejects_inverted_size_bounds() {
        let temp = TempDir::new().unwrap();
        let config = SweepConfig {
            image_dirs: vec![temp.path().to_path_buf()],
            min_file_size_bytes: 100,
            max_file_size_bytes: 10,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSizeBounds { .. })
        ));
    }

    #[test]
    fn validate_rejects_out_of_range_hash_size() {
        let temp = TempDir::new().unwrap();
        let config = SweepConfig {
            image_dirs: vec![temp.path().to_path_buf()],
            hash_size: 64,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidHashSize { value: 64 })
        ));
    }

    #[test]
    fn from_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sweep.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{ "min_age_days": 7 }"#).unwrap();

        let config = SweepConfig::from_file(&path).unwrap();
        assert_eq!(config.min_age_days, 7);
        assert_eq!(config.hash_size, 8); // default preserved
    }

    #[test]
    fn from_file_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sweep.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"not json").unwrap();

        assert!(matches!(
            SweepConfig::from_file(&path),
            Err(ConfigError::Malformed { .. })
        ));
    }

    #[test]
    fn from_file_missing_file_is_unreadable() {
        assert!(matches!(
            SweepConfig::from_file(Path::new("/nonexistent/sweep.json")),
            Err(ConfigError::Unreadable { .. })
        ));
    }
}
