//! # Image Sweeper
//!
//! Reconciles an uploaded-image store against its system of record.
//!
//! ## Core Philosophy
//! - **Never touch a file that might be in use** - the reference baseline
//!   is mandatory; no baseline, no action
//! - **Dry-run by default** - every run can be previewed before any move
//! - **Reversible** - files are quarantined, not deleted, unless explicitly
//!   asked otherwise
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and thin surfaces:
//! - `core` - reference scanning, validation, similarity indexing,
//!   classification, execution, reporting
//! - `events` - event-driven progress reporting
//! - `error` - error taxonomy (fatal vs. per-file)
//! - `cli` - command-line interface

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, SweeperError};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
