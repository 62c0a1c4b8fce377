//! Directory walking implementation using walkdir.

use super::{filter::ExtensionFilter, CandidateFile, ScanOutcome};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Single-threaded scanner feeding the parallel phases.
///
/// The walk itself stays sequential so that `seq` assignment is a stable
/// total order over the discovered files.
pub struct DirectoryScanner {
    filter: ExtensionFilter,
}

impl DirectoryScanner {
    /// Create a scanner accepting the given extensions
    pub fn new(allowed_extensions: &[String]) -> Self {
        Self {
            filter: ExtensionFilter::new(allowed_extensions),
        }
    }

    /// Walk all roots in order, assigning sequence numbers as files are
    /// discovered.
    pub fn scan(&self, roots: &[PathBuf], events: &EventSender) -> ScanOutcome {
        events.send(Event::Scan(ScanEvent::Started {
            roots: roots.to_vec(),
        }));

        let mut files = Vec::new();
        let mut errors = Vec::new();

        for root in roots {
            self.scan_root(root, &mut files, &mut errors, events);
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_files: files.len(),
        }));

        ScanOutcome { files, errors }
    }

    fn scan_root(
        &self,
        root: &Path,
        files: &mut Vec<CandidateFile>,
        errors: &mut Vec<ScanError>,
        events: &EventSender,
    ) {
        if !root.is_dir() {
            errors.push(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
            return;
        }

        // Sorted traversal makes seq reproducible across runs and
        // platforms; hidden entries are pruned before descent
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));

        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    let error = if e.io_error().map(|io| io.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadFailed {
                            path: path.clone(),
                            source: std::io::Error::other(e.to_string()),
                        }
                    };

                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    errors.push(error);
                    continue;
                }
            };

            let path = entry.path();

            if path.is_dir() {
                continue;
            }

            if !self.filter.should_include(path) {
                continue;
            }

            match fs::metadata(path) {
                Ok(metadata) => {
                    let candidate = CandidateFile {
                        path: path.to_path_buf(),
                        size_bytes: metadata.len(),
                        modified: metadata
                            .modified()
                            .unwrap_or(std::time::SystemTime::UNIX_EPOCH),
                        extension: self.filter.extension_of(path).unwrap_or_default(),
                        seq: files.len(),
                    };

                    events.send(Event::Scan(ScanEvent::FileFound {
                        path: candidate.path.clone(),
                    }));
                    files.push(candidate);
                }
                Err(e) => {
                    let error = ScanError::ReadFailed {
                        path: path.to_path_buf(),
                        source: e,
                    };
                    events.send(Event::Scan(ScanEvent::Error {
                        path: path.to_path_buf(),
                        message: error.to_string(),
                    }));
                    errors.push(error);
                }
            }
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::null_sender;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn scanner() -> DirectoryScanner {
        DirectoryScanner::new(&["jpg".to_string(), "png".to_string()])
    }

    fn create_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(b"stub").unwrap();
        path
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let temp = TempDir::new().unwrap();
        let outcome = scanner().scan(&[temp.path().to_path_buf()], &null_sender());

        assert!(outcome.files.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn finds_images_and_skips_others() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "a.jpg");
        create_file(temp.path(), "b.png");
        create_file(temp.path(), "notes.txt");

        let outcome = scanner().scan(&[temp.path().to_path_buf()], &null_sender());

        assert_eq!(outcome.files.len(), 2);
    }

    #[test]
    fn seq_is_dense_and_ordered() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "a.jpg");
        create_file(temp.path(), "b.jpg");
        create_file(temp.path(), "c.jpg");

        let outcome = scanner().scan(&[temp.path().to_path_buf()], &null_sender());

        let seqs: Vec<usize> = outcome.files.iter().map(|f| f.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[test]
    fn walk_order_is_lexicographic() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "zebra.jpg");
        create_file(temp.path(), "apple.jpg");
        create_file(temp.path(), "mango.jpg");

        let outcome = scanner().scan(&[temp.path().to_path_buf()], &null_sender());

        let names: Vec<String> = outcome.files.iter().map(|f| f.basename()).collect();
        assert_eq!(names, vec!["apple.jpg", "mango.jpg", "zebra.jpg"]);
    }

    #[test]
    fn seq_spans_multiple_roots() {
        let temp_a = TempDir::new().unwrap();
        let temp_b = TempDir::new().unwrap();
        create_file(temp_a.path(), "a.jpg");
        create_file(temp_b.path(), "b.jpg");

        let outcome = scanner().scan(
            &[temp_a.path().to_path_buf(), temp_b.path().to_path_buf()],
            &null_sender(),
        );

        assert_eq!(outcome.files.len(), 2);
        assert_eq!(outcome.files[0].seq, 0);
        assert_eq!(outcome.files[1].seq, 1);
        assert!(outcome.files[0].path.starts_with(temp_a.path()));
    }

    #[test]
    fn traverses_nested_directories() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("2024/01");
        fs::create_dir_all(&nested).unwrap();
        create_file(temp.path(), "root.jpg");
        create_file(&nested, "nested.jpg");

        let outcome = scanner().scan(&[temp.path().to_path_buf()], &null_sender());

        assert_eq!(outcome.files.len(), 2);
    }

    #[test]
    fn missing_root_records_error_not_panic() {
        let outcome = scanner().scan(&[PathBuf::from("/nonexistent/path/12345")], &null_sender());

        assert!(outcome.files.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(
            outcome.errors[0],
            ScanError::DirectoryNotFound { .. }
        ));
    }

    #[test]
    fn hidden_files_are_skipped() {
        let temp = TempDir::new().unwrap();
        create_file(temp.path(), "visible.jpg");
        create_file(temp.path(), ".partial.jpg");

        let outcome = scanner().scan(&[temp.path().to_path_buf()], &null_sender());

        assert_eq!(outcome.files.len(), 1);
        assert!(outcome.files[0].path.ends_with("visible.jpg"));
    }

    #[test]
    fn hidden_directories_are_not_descended() {
        let temp = TempDir::new().unwrap();
        let hidden = temp.path().join(".thumbnails");
        fs::create_dir(&hidden).unwrap();
        create_file(&hidden, "thumb.jpg");
        create_file(temp.path(), "real.jpg");

        let outcome = scanner().scan(&[temp.path().to_path_buf()], &null_sender());

        assert_eq!(outcome.files.len(), 1);
        assert!(outcome.files[0].path.ends_with("real.jpg"));
    }
}
