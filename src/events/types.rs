//! Event type definitions for progress reporting.

use crate::core::classifier::Disposition;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the sweep pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Reference-baseline phase events
    Reference(ReferenceEvent),
    /// Directory-walk phase events
    Scan(ScanEvent),
    /// Validate + hash phase events
    Analyze(AnalyzeEvent),
    /// Classification/execution phase events
    Apply(ApplyEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the reference scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReferenceEvent {
    /// Querying the document store has started
    Started,
    /// One collection has been scanned
    CollectionScanned {
        collection: String,
        references_so_far: usize,
    },
    /// The baseline is complete
    Completed { total_references: usize },
}

/// Events during the directory walk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Walking has started
    Started { roots: Vec<PathBuf> },
    /// A candidate file was found
    FileFound { path: PathBuf },
    /// A non-fatal error occurred; the walk continues
    Error { path: PathBuf, message: String },
    /// Walking completed
    Completed { total_files: usize },
}

/// Events during the parallel validate + hash phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnalyzeEvent {
    /// Analysis has started
    Started { total_files: usize },
    /// Progress update
    Progress(AnalyzeProgress),
    /// A file failed to decode; it will be classified Invalid
    DecodeFailed { path: PathBuf, message: String },
    /// Analysis completed
    Completed {
        total_hashed: usize,
        duplicate_groups: usize,
    },
}

/// Progress information during analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeProgress {
    /// Files analyzed so far
    pub completed: usize,
    /// Total files to analyze
    pub total: usize,
    /// File most recently analyzed
    pub current_path: PathBuf,
}

/// Events while dispositions are applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ApplyEvent {
    /// Application has started
    Started { total_files: usize, dry_run: bool },
    /// A file was classified
    Classified {
        path: PathBuf,
        disposition: Disposition,
    },
    /// A file was moved to quarantine
    Moved { from: PathBuf, to: PathBuf },
    /// A file was permanently deleted
    Deleted { path: PathBuf },
    /// A move or delete failed; the run continues
    Error { path: PathBuf, message: String },
    /// Application completed
    Completed { total_actions: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// The pipeline has started
    Started,
    /// A new phase has begun
    PhaseChanged { phase: PipelinePhase },
    /// Cancellation was observed; no new work will be scheduled
    Cancelled,
    /// The pipeline finished
    Completed { summary: PipelineSummary },
}

/// The phases of a sweep run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    /// Building the reference baseline from the document store
    ReferenceScan,
    /// Walking the image directories
    Scanning,
    /// Validating and hashing candidates
    Analyzing,
    /// Classifying and applying dispositions
    Applying,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::ReferenceScan => write!(f, "Scanning references"),
            PipelinePhase::Scanning => write!(f, "Scanning directories"),
            PipelinePhase::Analyzing => write!(f, "Analyzing images"),
            PipelinePhase::Applying => write!(f, "Applying dispositions"),
        }
    }
}

/// Compact end-of-run numbers carried on the completion event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub total_processed: usize,
    pub duplicates_found: usize,
    pub unused_found: usize,
    pub errors: usize,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_display_is_human_readable() {
        assert_eq!(
            PipelinePhase::ReferenceScan.to_string(),
            "Scanning references"
        );
        assert_eq!(PipelinePhase::Applying.to_string(), "Applying dispositions");
    }
}
