//! The abstract document store capability and its file-backed implementation.

use crate::error::ReferenceError;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A weakly-schematized document: arbitrary field names, arbitrary shapes
pub type Document = serde_json::Map<String, Value>;

/// Read-only access to the system of record.
///
/// Implement this trait to back the reference scan with a real database,
/// a dump file, or an in-memory fixture for tests. The engine only ever
/// reads; it never writes to the store.
pub trait DocumentStore: Send + Sync {
    /// Visit every document in `collection`, projected to `fields`.
    ///
    /// Implementations may ignore the projection and pass whole documents;
    /// the scanner only reads the fields it asked for. An unknown
    /// collection yields zero documents, not an error.
    fn for_each_document(
        &self,
        collection: &str,
        fields: &[&str],
        visit: &mut dyn FnMut(&Document),
    ) -> Result<(), ReferenceError>;
}

/// A [`DocumentStore`] over a JSON dump file.
///
/// The dump is an object keyed by collection name, each holding an array
/// of documents:
///
/// ```json
/// { "products": [ { "image": "a.jpg" }, { "images": ["b.jpg"] } ] }
/// ```
pub struct JsonFileStore {
    collections: HashMap<String, Vec<Document>>,
}

impl JsonFileStore {
    /// Load a dump file. Missing or malformed dumps are fatal: they mean
    /// no reference baseline exists.
    pub fn open(path: &Path) -> Result<Self, ReferenceError> {
        let contents = fs::read_to_string(path).map_err(|source| ReferenceError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let root: Value =
            serde_json::from_str(&contents).map_err(|e| ReferenceError::ParseFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let Value::Object(map) = root else {
            return Err(ReferenceError::ParseFailed {
                path: path.to_path_buf(),
                reason: "top level must be an object keyed by collection".to_string(),
            });
        };

        let mut collections = HashMap::new();
        for (name, value) in map {
            let Value::Array(items) = value else {
                return Err(ReferenceError::ParseFailed {
                    path: path.to_path_buf(),
                    reason: format!("collection '{}' must be an array", name),
                });
            };

            let docs = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(doc) => Some(doc),
                    _ => {
                        tracing::warn!(collection = %name, "skipping non-object document in dump");
                        None
                    }
                })
                .collect();
            collections.insert(name, docs);
        }

        Ok(Self { collections })
    }

    /// Build a store from in-memory collections (used by tests)
    pub fn from_collections(collections: HashMap<String, Vec<Document>>) -> Self {
        Self { collections }
    }
}

impl DocumentStore for JsonFileStore {
    fn for_each_document(
        &self,
        collection: &str,
        _fields: &[&str],
        visit: &mut dyn FnMut(&Document),
    ) -> Result<(), ReferenceError> {
        if let Some(docs) = self.collections.get(collection) {
            for doc in docs {
                visit(doc);
            }
        }
        Ok(())
    }
}

/// A store that always fails, for exercising fatal-path behavior in tests
pub struct UnreachableStore {
    pub path: PathBuf,
}

impl DocumentStore for UnreachableStore {
    fn for_each_document(
        &self,
        collection: &str,
        _fields: &[&str],
        _visit: &mut dyn FnMut(&Document),
    ) -> Result<(), ReferenceError> {
        Err(ReferenceError::QueryFailed {
            collection: collection.to_string(),
            reason: format!("store at {} is unreachable", self.path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_dump(contents: &str) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dump.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (temp, path)
    }

    #[test]
    fn open_loads_collections() {
        let (_temp, path) = write_dump(r#"{ "products": [ { "image": "a.jpg" } ] }"#);
        let store = JsonFileStore::open(&path).unwrap();

        let mut seen = 0;
        store
            .for_each_document("products", &["image"], &mut |doc| {
                assert_eq!(doc.get("image").unwrap(), "a.jpg");
                seen += 1;
            })
            .unwrap();
        assert_eq!(seen, 1);
    }

    #[test]
    fn unknown_collection_yields_no_documents() {
        let (_temp, path) = write_dump(r#"{ "products": [] }"#);
        let store = JsonFileStore::open(&path).unwrap();

        let mut seen = 0;
        store
            .for_each_document("users", &["avatar"], &mut |_| seen += 1)
            .unwrap();
        assert_eq!(seen, 0);
    }

    #[test]
    fn malformed_dump_is_fatal() {
        let (_temp, path) = write_dump("[1, 2, 3]");
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(ReferenceError::ParseFailed { .. })
        ));
    }

    #[test]
    fn missing_dump_is_fatal() {
        assert!(matches!(
            JsonFileStore::open(Path::new("/nonexistent/dump.json")),
            Err(ReferenceError::OpenFailed { .. })
        ));
    }

    #[test]
    fn non_object_documents_are_skipped() {
        let (_temp, path) = write_dump(r#"{ "products": [ "stray", { "image": "a.jpg" } ] }"#);
        let store = JsonFileStore::open(&path).unwrap();

        let mut seen = 0;
        store
            .for_each_document("products", &["image"], &mut |_| seen += 1)
            .unwrap();
        assert_eq!(seen, 1);
    }
}
