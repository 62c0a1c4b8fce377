//! Applies dispositions to the filesystem.
//!
//! Moves are preferred over deletes: a quarantined file can be restored
//! for at least one cleanup cycle. All failures here are per-file; they
//! are logged and counted, never escalated.

use super::classifier::Disposition;
use super::scanner::CandidateFile;
use crate::error::ExecuteError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// What to do with actionable files in execute mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMode {
    /// Move into the quarantine directory (default, reversible)
    MoveToQuarantine,
    /// Permanently delete (opt-in)
    Delete,
}

/// The effect the executor had (or would have had) on one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No filesystem action for this disposition
    None,
    /// Dry-run: the action that execute mode would take
    Planned { description: String },
    /// The file was moved to quarantine
    Moved { to: PathBuf },
    /// The file was permanently deleted
    Deleted,
}

/// Applies a disposition to one file at a time
pub struct Executor {
    quarantine_dir: PathBuf,
    mode: ActionMode,
    dry_run: bool,
    /// Serializes quarantine target selection and the move itself.
    /// Selection probes `exists()` and the rename is a separate syscall;
    /// without the lock two workers moving same-basename files can claim
    /// the same target and one quarantined file is silently replaced.
    placement: Mutex<()>,
}

impl Executor {
    /// Create an executor for one run
    pub fn new(quarantine_dir: PathBuf, mode: ActionMode, dry_run: bool) -> Self {
        Self {
            quarantine_dir,
            mode,
            dry_run,
            placement: Mutex::new(()),
        }
    }

    /// Apply `disposition` to `file`.
    ///
    /// Keep/Invalid/SizeOutOfRange never touch the filesystem; Invalid and
    /// SizeOutOfRange files might be mid-upload and require manual review.
    pub fn apply(
        &self,
        file: &CandidateFile,
        disposition: Disposition,
    ) -> Result<Action, ExecuteError> {
        match disposition {
            Disposition::Keep => Ok(Action::None),
            Disposition::Invalid => {
                tracing::info!(path = %file.path.display(), "invalid file left for manual review");
                Ok(Action::None)
            }
            Disposition::SizeOutOfRange => {
                tracing::info!(
                    path = %file.path.display(),
                    size = file.size_bytes,
                    "file outside size bounds left untouched"
                );
                Ok(Action::None)
            }
            Disposition::Duplicate | Disposition::Unused => self.remove(file, disposition),
        }
    }

    fn remove(
        &self,
        file: &CandidateFile,
        disposition: Disposition,
    ) -> Result<Action, ExecuteError> {
        if self.dry_run {
            let description = match self.mode {
                ActionMode::MoveToQuarantine => format!(
                    "would move {} ({}) to {}",
                    file.path.display(),
                    disposition,
                    self.quarantine_dir.display()
                ),
                ActionMode::Delete => {
                    format!("would delete {} ({})", file.path.display(), disposition)
                }
            };
            tracing::info!("{}", description);
            return Ok(Action::Planned { description });
        }

        if !file.path.exists() {
            return Err(ExecuteError::SourceMissing {
                path: file.path.clone(),
            });
        }

        match self.mode {
            ActionMode::MoveToQuarantine => {
                fs::create_dir_all(&self.quarantine_dir).map_err(|source| {
                    ExecuteError::QuarantineUnavailable {
                        path: self.quarantine_dir.clone(),
                        source,
                    }
                })?;

                let _guard = self
                    .placement
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                let target = self.free_target_for(&file.path);
                move_file(&file.path, &target).map_err(|source| ExecuteError::MoveFailed {
                    path: file.path.clone(),
                    source,
                })?;

                tracing::info!(
                    from = %file.path.display(),
                    to = %target.display(),
                    %disposition,
                    "moved to quarantine"
                );
                Ok(Action::Moved { to: target })
            }
            ActionMode::Delete => {
                fs::remove_file(&file.path).map_err(|source| ExecuteError::DeleteFailed {
                    path: file.path.clone(),
                    source,
                })?;

                tracing::info!(path = %file.path.display(), %disposition, "deleted");
                Ok(Action::Deleted)
            }
        }
    }

    /// Pick a collision-free target path in quarantine.
    ///
    /// If the basename is taken, append `_1`, `_2`, ... before the
    /// extension until a free name is found. Targets are deliberately not
    /// overwritten; two sources with the same basename must both survive
    /// quarantine.
    fn free_target_for(&self, source: &Path) -> PathBuf {
        let basename = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());

        let candidate = self.quarantine_dir.join(&basename);
        if !candidate.exists() {
            return candidate;
        }

        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        let extension = source.extension().map(|e| e.to_string_lossy().into_owned());

        let mut counter = 1;
        loop {
            let name = match &extension {
                Some(ext) => format!("{}_{}.{}", stem, counter, ext),
                None => format!("{}_{}", stem, counter),
            };
            let candidate = self.quarantine_dir.join(name);
            if !candidate.exists() {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// Rename, falling back to copy + verify + delete across filesystems.
///
/// An incomplete copy is rolled back and the source left in place.
fn move_file(source: &Path, target: &Path) -> std::io::Result<()> {
    fs::rename(source, target).or_else(|_| {
        let source_size = fs::metadata(source)?.len();
        fs::copy(source, target)?;

        let target_size = fs::metadata(target)?.len();
        if target_size != source_size {
            let _ = fs::remove_file(target);
            return Err(std::io::Error::other(format!(
                "copy verification failed: source {} bytes, target {} bytes",
                source_size, target_size
            )));
        }

        fs::remove_file(source)
    })
}
