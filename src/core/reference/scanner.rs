//! Extracts live image references from the document store.

use super::{Document, DocumentStore, ReferenceSet};
use crate::error::ReferenceError;
use crate::events::{Event, EventSender, ReferenceEvent};
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::OnceLock;

/// The collections and image-bearing fields the system of record uses.
///
/// Filename matching is the primary mechanism; precomputed hash fields
/// (e.g. `image_hash`) are deliberately not listed here because a hash is
/// not a path reference.
pub const COLLECTION_FIELDS: &[(&str, &[&str])] = &[
    ("catalogs", &["images", "image", "logo"]),
    ("products", &["images", "image"]),
    ("users", &["avatar", "profile_photo"]),
];

fn remote_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // RFC 3986 scheme prefix: remote URLs are not local files and cannot
    // be orphaned locally
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("valid regex"))
}

/// Scans the document store for all filenames known to be in use
pub struct ReferenceScanner;

impl ReferenceScanner {
    /// Build the reference baseline.
    ///
    /// A store failure is fatal and aborts the whole run; no file action
    /// may proceed without a baseline.
    pub fn scan(store: &dyn DocumentStore) -> Result<ReferenceSet, ReferenceError> {
        Self::scan_with_events(store, &crate::events::null_sender())
    }

    /// Build the reference baseline with progress events
    pub fn scan_with_events(
        store: &dyn DocumentStore,
        events: &EventSender,
    ) -> Result<ReferenceSet, ReferenceError> {
        events.send(Event::Reference(ReferenceEvent::Started));

        let mut refs = ReferenceSet::new();

        for (collection, fields) in COLLECTION_FIELDS {
            store.for_each_document(collection, fields, &mut |doc| {
                collect_from_document(doc, collection, fields, &mut refs);
            })?;

            events.send(Event::Reference(ReferenceEvent::CollectionScanned {
                collection: collection.to_string(),
                references_so_far: refs.len(),
            }));
        }

        tracing::info!(references = refs.len(), "reference baseline built");
        events.send(Event::Reference(ReferenceEvent::Completed {
            total_references: refs.len(),
        }));

        Ok(refs)
    }
}

fn collect_from_document(
    doc: &Document,
    collection: &str,
    fields: &[&str],
    refs: &mut ReferenceSet,
) {
    for field in fields {
        let Some(value) = doc.get(*field) else {
            continue;
        };

        match value {
            Value::String(s) => record_reference(s, refs),
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(s) => record_reference(s, refs),
                        _ => tracing::warn!(
                            collection,
                            field,
                            "skipping non-string entry in list field"
                        ),
                    }
                }
            }
            Value::Null => {}
            other => tracing::warn!(
                collection,
                field,
                shape = %shape_of(other),
                "skipping field with unexpected shape"
            ),
        }
    }
}

/// Normalize a raw field value to a basename and record it.
///
/// Remote URLs are dropped; everything else is stripped to its final path
/// component, case preserved.
fn record_reference(raw: &str, refs: &mut ReferenceSet) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }

    if remote_url_pattern().is_match(trimmed) {
        return;
    }

    if let Some(name) = Path::new(trimmed).file_name().and_then(|n| n.to_str()) {
        refs.insert(name.to_string());
    }
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reference::JsonFileStore;
    use serde_json::json;
    use std::collections::HashMap;

    fn doc(value: serde_json::Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    fn store_with(collection: &str, docs: Vec<Document>) -> JsonFileStore {
        let mut collections = HashMap::new();
        collections.insert(collection.to_string(), docs);
        JsonFileStore::from_collections(collections)
    }

    #[test]
    fn string_field_is_collected() {
        let store = store_with("products", vec![doc(json!({ "image": "widget.jpg" }))]);
        let refs = ReferenceScanner::scan(&store).unwrap();

        assert!(refs.contains("widget.jpg"));
    }

    #[test]
    fn list_field_is_collected() {
        let store = store_with(
            "products",
            vec![doc(json!({ "images": ["a.jpg", "b.png"] }))],
        );
        let refs = ReferenceScanner::scan(&store).unwrap();

        assert!(refs.contains("a.jpg"));
        assert!(refs.contains("b.png"));
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn path_prefix_is_stripped() {
        let store = store_with(
            "catalogs",
            vec![doc(json!({ "logo": "uploads/2024/brand.png" }))],
        );
        let refs = ReferenceScanner::scan(&store).unwrap();

        assert!(refs.contains("brand.png"));
        assert!(!refs.contains("uploads/2024/brand.png"));
    }

    #[test]
    fn remote_urls_are_skipped() {
        let store = store_with(
            "users",
            vec![doc(json!({
                "avatar": "https://cdn.example.com/u/42.png",
                "profile_photo": "local.png"
            }))],
        );
        let refs = ReferenceScanner::scan(&store).unwrap();

        assert!(!refs.contains("42.png"));
        assert!(refs.contains("local.png"));
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn malformed_fields_are_skipped_not_fatal() {
        let store = store_with(
            "products",
            vec![
                doc(json!({ "image": 42 })),
                doc(json!({ "images": [true, "good.jpg"] })),
                doc(json!({ "image": null })),
            ],
        );
        let refs = ReferenceScanner::scan(&store).unwrap();

        assert_eq!(refs.len(), 1);
        assert!(refs.contains("good.jpg"));
    }

    #[test]
    fn unconfigured_fields_are_ignored() {
        let store = store_with(
            "products",
            vec![doc(json!({ "image_hash": "deadbeef", "image": "real.jpg" }))],
        );
        let refs = ReferenceScanner::scan(&store).unwrap();

        assert_eq!(refs.len(), 1);
        assert!(!refs.contains("deadbeef"));
    }

    #[test]
    fn store_failure_is_fatal() {
        let store = crate::core::reference::UnreachableStore {
            path: "/var/db".into(),
        };
        assert!(ReferenceScanner::scan(&store).is_err());
    }

    #[test]
    fn empty_and_whitespace_values_are_ignored() {
        let store = store_with("products", vec![doc(json!({ "image": "   " }))]);
        let refs = ReferenceScanner::scan(&store).unwrap();

        assert!(refs.is_empty());
    }
}
