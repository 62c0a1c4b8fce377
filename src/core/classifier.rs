//! Disposition logic: decides what happens to each candidate file.
//!
//! Classification is a pure function of the file's size, validity,
//! duplicate-group membership, age and reference membership. It never
//! consults the dry-run flag, so simulate and execute runs always decide
//! identically.

use super::config::SweepConfig;
use super::indexer::AnalysisOutcome;
use super::reference::ReferenceSet;
use super::scanner::CandidateFile;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// What the run will do with a file; exactly one per file per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    /// In use, too young, or the retained copy of its group
    Keep,
    /// A redundant copy of a perceptually identical file
    Duplicate,
    /// Old enough and unreferenced by the system of record
    Unused,
    /// Failed decode or dimension rules; logged for manual review only
    Invalid,
    /// Outside the configured size bounds; likely mid-upload or corrupt,
    /// never touched
    SizeOutOfRange,
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Disposition::Keep => write!(f, "keep"),
            Disposition::Duplicate => write!(f, "duplicate"),
            Disposition::Unused => write!(f, "unused"),
            Disposition::Invalid => write!(f, "invalid"),
            Disposition::SizeOutOfRange => write!(f, "size-out-of-range"),
        }
    }
}

/// Classifies candidates against the analysis outcome and reference set
pub struct Classifier<'a> {
    config: &'a SweepConfig,
    analysis: &'a AnalysisOutcome,
    refs: &'a ReferenceSet,
    now: SystemTime,
}

impl<'a> Classifier<'a> {
    /// Create a classifier for one run; `now` is fixed up front so every
    /// file is aged against the same instant
    pub fn new(
        config: &'a SweepConfig,
        analysis: &'a AnalysisOutcome,
        refs: &'a ReferenceSet,
        now: SystemTime,
    ) -> Self {
        Self {
            config,
            analysis,
            refs,
            now,
        }
    }

    /// Decide the disposition for one file. First match wins:
    ///
    /// 1. size outside the inclusive bounds -> SizeOutOfRange
    /// 2. failed validation -> Invalid
    /// 3. redundant group member -> Duplicate, unless referenced -> Keep
    /// 4. older than the grace period and unreferenced -> Unused
    /// 5. otherwise -> Keep
    ///
    /// Rule 3's reference guard is a deliberate departure from the legacy
    /// behavior, which discarded a duplicate copy even when the database
    /// pointed at that exact copy.
    pub fn classify(&self, file: &CandidateFile) -> Disposition {
        if file.size_bytes < self.config.min_file_size_bytes
            || file.size_bytes > self.config.max_file_size_bytes
        {
            return Disposition::SizeOutOfRange;
        }

        let referenced = self.refs.contains_basename(&file.path);

        match self.analysis.files.get(&file.path) {
            Some(analyzed) if analyzed.validity.is_valid() => {
                if self.analysis.index.is_redundant_copy(&file.path) {
                    if referenced {
                        tracing::debug!(
                            path = %file.path.display(),
                            "referenced duplicate copy kept (reference wins)"
                        );
                        return Disposition::Keep;
                    }
                    return Disposition::Duplicate;
                }
            }
            // Not analyzed (cancelled mid-run) counts as not validated
            _ => return Disposition::Invalid,
        }

        if file.age_days(self.now) > self.config.min_age_days && !referenced {
            return Disposition::Unused;
        }

        Disposition::Keep
    }
}
