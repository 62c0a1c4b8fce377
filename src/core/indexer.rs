//! Similarity indexing: groups perceptually identical files.
//!
//! Hashing is parallel, but group membership order must be the directory
//! walk order because the first member of a group is the retained copy.
//! Each file's `seq` was captured before this phase; results are sorted by
//! it before buckets are built, so worker completion order can never
//! affect which copy survives.

use super::hasher::{AverageHasher, ContentHash};
use super::scanner::CandidateFile;
use super::validator::{ContentValidator, Validity};
use crate::events::{AnalyzeEvent, AnalyzeProgress, Event, EventSender};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Per-file result of the analyze pass
#[derive(Debug)]
pub struct AnalyzedFile {
    /// Walk sequence number of the file
    pub seq: usize,
    /// Decode outcome
    pub validity: Validity,
    /// Content hash, present only for valid files
    pub hash: Option<ContentHash>,
}

/// Read-only duplicate lookup built once per run
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    /// hash -> members in walk order; every bucket has >= 2 members
    groups: HashMap<ContentHash, Vec<PathBuf>>,
    /// path -> position within its group (0 = retained copy)
    positions: HashMap<PathBuf, usize>,
}

impl DuplicateIndex {
    /// True if `path` belongs to a duplicate group but is not its
    /// retained (first-discovered) member
    pub fn is_redundant_copy(&self, path: &Path) -> bool {
        self.positions.get(path).is_some_and(|&pos| pos > 0)
    }

    /// True if `path` belongs to any duplicate group
    pub fn is_grouped(&self, path: &Path) -> bool {
        self.positions.contains_key(path)
    }

    /// The members of the group containing `path`, in walk order
    pub fn group_of(&self, path: &Path) -> Option<&[PathBuf]> {
        self.groups
            .values()
            .find(|members| members.iter().any(|m| m == path))
            .map(|members| members.as_slice())
    }

    /// All duplicate groups
    pub fn groups(&self) -> impl Iterator<Item = (&ContentHash, &[PathBuf])> {
        self.groups.iter().map(|(h, m)| (h, m.as_slice()))
    }

    /// Number of duplicate groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Build an index directly from group member lists (test fixtures)
    #[cfg(test)]
    pub(crate) fn insert_group_for_tests(&mut self, hash: ContentHash, members: Vec<PathBuf>) {
        for (pos, member) in members.iter().enumerate() {
            self.positions.insert(member.clone(), pos);
        }
        self.groups.insert(hash, members);
    }
}

/// Outcome of the analyze phase
pub struct AnalysisOutcome {
    /// Per-file validity and hash, keyed by path
    pub files: HashMap<PathBuf, AnalyzedFile>,
    /// Groups of perceptually identical files
    pub index: DuplicateIndex,
}

/// Validates and hashes candidates, then builds the duplicate index
pub struct SimilarityIndexer {
    validator: ContentValidator,
    hasher: AverageHasher,
}

impl SimilarityIndexer {
    /// Create an indexer from the configured thresholds
    pub fn new(min_dimension_px: u32, hash_size: u32) -> Self {
        Self {
            validator: ContentValidator::new(min_dimension_px),
            hasher: AverageHasher::new(hash_size),
        }
    }

    /// Decode, validate and hash every candidate exactly once.
    ///
    /// Runs on the ambient rayon pool; the pipeline installs a bounded
    /// pool around this call. Files scheduled before cancellation is
    /// observed are finished; the rest are skipped and absent from the
    /// outcome.
    pub fn build_index(
        &self,
        files: &[CandidateFile],
        events: &EventSender,
        cancelled: &Arc<AtomicBool>,
    ) -> AnalysisOutcome {
        events.send(Event::Analyze(AnalyzeEvent::Started {
            total_files: files.len(),
        }));

        let completed = AtomicUsize::new(0);
        let total = files.len();

        let mut analyzed: Vec<(PathBuf, AnalyzedFile)> = files
            .par_iter()
            .filter_map(|file| {
                if cancelled.load(Ordering::SeqCst) {
                    return None;
                }

                let (validity, image) = self.validator.validate(&file.path);

                if let Validity::Corrupt { ref reason } = validity {
                    events.send(Event::Analyze(AnalyzeEvent::DecodeFailed {
                        path: file.path.clone(),
                        message: reason.clone(),
                    }));
                }

                let hash = image.map(|img| self.hasher.hash_image(&img));

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                events.send(Event::Analyze(AnalyzeEvent::Progress(AnalyzeProgress {
                    completed: done,
                    total,
                    current_path: file.path.clone(),
                })));

                Some((
                    file.path.clone(),
                    AnalyzedFile {
                        seq: file.seq,
                        validity,
                        hash,
                    },
                ))
            })
            .collect();

        // Walk order, not worker completion order, decides retention
        analyzed.sort_by_key(|(_, a)| a.seq);

        let mut buckets: HashMap<ContentHash, Vec<PathBuf>> = HashMap::new();
        for (path, analyzed_file) in &analyzed {
            if let Some(hash) = &analyzed_file.hash {
                buckets.entry(hash.clone()).or_default().push(path.clone());
            }
        }

        // A group of one is not a duplicate group
        buckets.retain(|_, members| members.len() > 1);

        let mut positions = HashMap::new();
        for members in buckets.values() {
            for (pos, member) in members.iter().enumerate() {
                positions.insert(member.clone(), pos);
            }
        }

        let index = DuplicateIndex {
            groups: buckets,
            positions,
        };

        let hashed = analyzed.iter().filter(|(_, a)| a.hash.is_some()).count();
        tracing::debug!(
            hashed,
            groups = index.group_count(),
            "similarity index built"
        );
        events.send(Event::Analyze(AnalyzeEvent::Completed {
            total_hashed: hashed,
            duplicate_groups: index.group_count(),
        }));

        AnalysisOutcome {
            files: analyzed.into_iter().collect(),
            index,
        }
    }
}
