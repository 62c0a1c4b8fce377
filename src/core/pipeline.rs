//! Orchestrates the full sweep workflow.
//!
//! Phases, in order: reference baseline (sequential, fatal on failure),
//! directory walk (sequential, assigns walk order), analyze (parallel
//! validate + hash), apply (parallel classify + execute), summarize.
//!
//! The dry-run flag is consulted only by the executor; classification is
//! identical in both modes.

use super::classifier::{Classifier, Disposition};
use super::config::SweepConfig;
use super::executor::{Action, ActionMode, Executor};
use super::indexer::SimilarityIndexer;
use super::reference::{DocumentStore, ReferenceScanner};
use super::reporter::{Notifier, RunStats, RunSummary};
use super::scanner::DirectoryScanner;
use crate::error::{ConfigError, SweeperError};
use crate::events::{
    null_sender, ApplyEvent, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary,
};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

/// Result of a pipeline run
#[derive(Debug)]
pub struct PipelineResult {
    /// Aggregated counters and timings
    pub summary: RunSummary,
    /// Every classified file and its disposition, sorted by path
    pub dispositions: Vec<(PathBuf, Disposition)>,
    /// True if the run was cut short by cancellation
    pub cancelled: bool,
}

/// Builder for the sweep pipeline
pub struct SweepPipelineBuilder<'a> {
    config: SweepConfig,
    store: &'a dyn DocumentStore,
    dry_run: bool,
    mode: ActionMode,
    notifier: Option<Box<dyn Notifier>>,
    cancel: Arc<AtomicBool>,
}

impl<'a> SweepPipelineBuilder<'a> {
    /// Dry-run by default; execute mode is always opt-in
    pub fn new(config: SweepConfig, store: &'a dyn DocumentStore) -> Self {
        Self {
            config,
            store,
            dry_run: true,
            mode: ActionMode::MoveToQuarantine,
            notifier: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set dry-run mode (true = no filesystem mutation)
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Quarantine move (default) or permanent delete
    pub fn action_mode(mut self, mode: ActionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Hand the final summary to an external channel
    pub fn notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Share a cancellation flag (e.g. wired to SIGINT)
    pub fn cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn build(self) -> SweepPipeline<'a> {
        SweepPipeline {
            config: self.config,
            store: self.store,
            dry_run: self.dry_run,
            mode: self.mode,
            notifier: self.notifier,
            cancel: self.cancel,
        }
    }
}

/// The sweep pipeline
pub struct SweepPipeline<'a> {
    config: SweepConfig,
    store: &'a dyn DocumentStore,
    dry_run: bool,
    mode: ActionMode,
    notifier: Option<Box<dyn Notifier>>,
    cancel: Arc<AtomicBool>,
}

impl<'a> SweepPipeline<'a> {
    /// Start building a pipeline
    pub fn builder(config: SweepConfig, store: &'a dyn DocumentStore) -> SweepPipelineBuilder<'a> {
        SweepPipelineBuilder::new(config, store)
    }

    /// Run without progress reporting
    pub fn run(&self) -> Result<PipelineResult, SweeperError> {
        self.run_with_events(&null_sender())
    }

    /// Run the full workflow.
    ///
    /// Fatal errors (config, reference baseline) abort with no filesystem
    /// mutation attempted; everything file-scoped is counted and the run
    /// continues.
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult, SweeperError> {
        let start = Instant::now();

        self.config.validate()?;

        events.send(Event::Pipeline(PipelineEvent::Started));
        let stats = RunStats::new();

        // Phase 1: reference baseline. No baseline, no action.
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::ReferenceScan,
        }));
        let refs = ReferenceScanner::scan_with_events(self.store, events)?;

        // Phase 2: directory walk
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));
        let scanner = DirectoryScanner::new(&self.config.allowed_extensions);
        let scan = scanner.scan(&self.config.image_dirs, events);
        for error in &scan.errors {
            tracing::warn!(error = %error, "scan error");
            stats.record_error();
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_workers)
            .build()
            .map_err(|e| ConfigError::WorkerPool {
                reason: e.to_string(),
            })?;

        // Phase 3: analyze. Files outside the size bounds are never
        // decoded; they are classified straight to SizeOutOfRange below.
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Analyzing,
        }));
        let in_range: Vec<_> = scan
            .files
            .iter()
            .filter(|f| {
                f.size_bytes >= self.config.min_file_size_bytes
                    && f.size_bytes <= self.config.max_file_size_bytes
            })
            .cloned()
            .collect();

        let indexer = SimilarityIndexer::new(self.config.min_dimension_px, self.config.hash_size);
        let analysis = pool.install(|| indexer.build_index(&in_range, events, &self.cancel));

        // Phase 4: classify and apply
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Applying,
        }));
        events.send(Event::Apply(ApplyEvent::Started {
            total_files: scan.files.len(),
            dry_run: self.dry_run,
        }));

        let now = SystemTime::now();
        let classifier = Classifier::new(&self.config, &analysis, &refs, now);
        let executor = Executor::new(self.config.quarantine_dir.clone(), self.mode, self.dry_run);

        let mut dispositions: Vec<(PathBuf, Disposition)> = pool.install(|| {
            scan.files
                .par_iter()
                .filter_map(|file| {
                    // Observe cancellation before scheduling each file;
                    // in-flight actions run to completion
                    if self.cancel.load(Ordering::SeqCst) {
                        return None;
                    }

                    let disposition = classifier.classify(file);
                    stats.record_processed();
                    match disposition {
                        Disposition::Duplicate => stats.record_duplicate(),
                        Disposition::Unused => stats.record_unused(),
                        Disposition::Invalid => stats.record_invalid(),
                        Disposition::SizeOutOfRange => stats.record_size_skipped(),
                        Disposition::Keep => {}
                    }

                    events.send(Event::Apply(ApplyEvent::Classified {
                        path: file.path.clone(),
                        disposition,
                    }));

                    match executor.apply(file, disposition) {
                        Ok(Action::Moved { to }) => {
                            stats.record_moved(file.size_bytes);
                            events.send(Event::Apply(ApplyEvent::Moved {
                                from: file.path.clone(),
                                to,
                            }));
                        }
                        Ok(Action::Deleted) => {
                            stats.record_deleted(file.size_bytes);
                            events.send(Event::Apply(ApplyEvent::Deleted {
                                path: file.path.clone(),
                            }));
                        }
                        Ok(Action::Planned { .. }) => stats.record_planned(),
                        Ok(Action::None) => {}
                        Err(e) => {
                            tracing::warn!(path = %file.path.display(), error = %e, "action failed");
                            stats.record_error();
                            events.send(Event::Apply(ApplyEvent::Error {
                                path: file.path.clone(),
                                message: e.to_string(),
                            }));
                        }
                    }

                    Some((file.path.clone(), disposition))
                })
                .collect()
        });
        dispositions.sort_by(|a, b| a.0.cmp(&b.0));

        let cancelled = self.cancel.load(Ordering::SeqCst);
        if cancelled {
            events.send(Event::Pipeline(PipelineEvent::Cancelled));
            tracing::info!("cancellation observed; no further dispositions applied");
        }

        let summary = stats.snapshot(self.dry_run, start.elapsed().as_millis() as u64);

        events.send(Event::Apply(ApplyEvent::Completed {
            total_actions: summary.moved + summary.deleted + summary.planned,
        }));
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_processed: summary.total_processed,
                duplicates_found: summary.duplicates_found,
                unused_found: summary.unused_found,
                errors: summary.errors,
                duration_ms: summary.duration_ms,
            },
        }));

        if let Some(notifier) = &self.notifier {
            let subject = if self.dry_run {
                "image sweep simulation finished"
            } else {
                "image sweep finished"
            };
            if let Err(e) = notifier.notify(subject, &summary.render()) {
                tracing::warn!(error = %e, "summary notification failed");
            }
        }

        Ok(PipelineResult {
            summary,
            dispositions,
            cancelled,
        })
    }
}
