//! # Core Module
//!
//! The UI-agnostic image reconciliation engine.
//!
//! ## Modules
//! - `config` - immutable run parameters
//! - `scanner` - discovers candidate files with stable walk order
//! - `reference` - builds the live-reference baseline from the document store
//! - `validator` - full-decode image validation
//! - `hasher` - perceptual content hashing
//! - `indexer` - groups perceptually identical files
//! - `classifier` - decides each file's disposition
//! - `executor` - applies dispositions (dry-run aware)
//! - `reporter` - run statistics and summary rendering
//! - `pipeline` - orchestrates the full workflow

pub mod classifier;
pub mod config;
pub mod executor;
pub mod hasher;
pub mod indexer;
pub mod pipeline;
pub mod reference;
pub mod reporter;
pub mod scanner;
pub mod validator;

// Re-export commonly used types
pub use classifier::Disposition;
pub use config::SweepConfig;
pub use hasher::ContentHash;
pub use indexer::DuplicateIndex;
pub use reference::{DocumentStore, ReferenceSet};
pub use reporter::{RunStats, RunSummary};
pub use scanner::CandidateFile;
