//! # Error Module
//!
//! Error taxonomy for the image sweeper.
//!
//! ## Design Principles
//! - **Fatal vs. per-file** - configuration and reference-baseline failures
//!   abort before any mutation; everything file-scoped is recorded and the
//!   run continues
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, collections, what went wrong

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error.
///
/// Only run-fatal failures surface here. Scan, execute and notify errors
/// are per-file or advisory: they are counted in the run statistics and
/// never abort a sweep.
#[derive(Error, Debug)]
pub enum SweeperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Reference baseline error: {0}")]
    Reference(#[from] ReferenceError),
}

/// Fatal configuration errors, raised before any scan
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("No image directories configured")]
    NoImageDirs,

    #[error("Image directory not found: {path}")]
    ImageDirNotFound { path: PathBuf },

    #[error("Invalid size bounds: min {min} exceeds max {max}")]
    InvalidSizeBounds { min: u64, max: u64 },

    #[error("Invalid hash size {value} (must be 4-32)")]
    InvalidHashSize { value: u32 },

    #[error("Failed to build worker pool: {reason}")]
    WorkerPool { reason: String },

    #[error("Failed to install signal handler: {reason}")]
    SignalHandler { reason: String },
}

/// Fatal errors reaching or querying the document store
///
/// Proceeding without a reference baseline would risk removing files the
/// database still points at, so these always abort the run.
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Failed to open document dump {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse document dump {path}: {reason}")]
    ParseFailed { path: PathBuf, reason: String },

    #[error("Document store query failed for collection '{collection}': {reason}")]
    QueryFailed { collection: String, reason: String },
}

/// Non-fatal errors during the directory walk
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Non-fatal errors applying a disposition to a single file
#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("Failed to create quarantine directory {path}: {source}")]
    QuarantineUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {path} to quarantine: {source}")]
    MoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete {path}: {source}")]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Source file vanished before action: {path}")]
    SourceMissing { path: PathBuf },
}

/// Errors delivering the end-of-run summary to an external channel
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Failed to deliver notification '{subject}': {reason}")]
    DeliveryFailed { subject: String, reason: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, SweeperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/srv/uploads"),
        };
        assert!(error.to_string().contains("/srv/uploads"));
    }

    #[test]
    fn reference_error_includes_collection() {
        let error = ReferenceError::QueryFailed {
            collection: "products".to_string(),
            reason: "connection reset".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("products"));
        assert!(message.contains("connection reset"));
    }

    #[test]
    fn signal_handler_error_names_the_handler() {
        let error = ConfigError::SignalHandler {
            reason: "already installed".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("signal handler"));
        assert!(message.contains("already installed"));
    }

    #[test]
    fn config_error_names_bounds() {
        let error = ConfigError::InvalidSizeBounds { min: 100, max: 10 };
        let message = error.to_string();
        assert!(message.contains("100"));
        assert!(message.contains("10"));
    }
}
