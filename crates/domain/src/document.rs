//! Sheet document aggregate and patch-merge semantics.
//!
//! A [`DocumentPatch`] is a flat map of dotted paths to values. Applying it
//! upserts every path, merging object values key by key. A key of the form
//! `-=<key>` whose value is `Null` removes `<key>` from the map it sits in.
//! Applying the same patch twice leaves the document unchanged the second
//! time.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::CollectionKind;
use crate::error::DomainError;
use crate::ids::DocumentId;
use crate::types::SheetValue;
use crate::value_objects::FieldPath;

/// Prefix marking a deletion sentinel key.
pub const DELETION_PREFIX: &str = "-=";

/// The owning aggregate: collections plus unrelated scalar attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "_id")]
    id: DocumentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    /// Every other top-level attribute, collections included.
    #[serde(flatten)]
    content: SheetValue,
}

impl Document {
    pub fn new(id: DocumentId) -> Self {
        Self {
            id,
            content: SheetValue::object(),
            updated_at: None,
        }
    }

    /// Build a document from existing content.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `content` is not an object.
    pub fn with_content(id: DocumentId, content: SheetValue) -> Result<Self, DomainError> {
        if content.as_object().is_none() {
            return Err(DomainError::validation("Document content must be an object"));
        }
        Ok(Self {
            id,
            content,
            updated_at: None,
        })
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn content(&self) -> &SheetValue {
        &self.content
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }

    /// The persisted name-keyed map of one collection.
    pub fn collection(
        &self,
        collection: &FieldPath,
    ) -> Option<&BTreeMap<String, SheetValue>> {
        self.content
            .get_path(collection.as_str())
            .and_then(SheetValue::as_object)
    }

    /// Keys currently persisted in a collection.
    pub fn collection_keys(&self, collection: &FieldPath) -> BTreeSet<String> {
        self.collection(collection)
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Convenience for `collection(FieldPath::collection(root, kind))`.
    pub fn collection_of(
        &self,
        root: &str,
        kind: CollectionKind,
    ) -> Option<&BTreeMap<String, SheetValue>> {
        let path = FieldPath::collection(root, kind).ok()?;
        self.collection(&path)
    }

    /// Apply a patch with upsert and `-=` deletion semantics.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the patch targets another document
    /// and `DomainError::Parse` if a path has an empty segment.
    pub fn apply(&mut self, patch: &DocumentPatch) -> Result<(), DomainError> {
        if patch.document_id != self.id {
            return Err(DomainError::validation(format!(
                "Patch for document {} applied to document {}",
                patch.document_id, self.id
            )));
        }

        if self.content.as_object().is_none() {
            self.content = SheetValue::object();
        }
        for (path, value) in &patch.updates {
            let path = FieldPath::parse(path.as_str())?;
            if let SheetValue::Object(root) = &mut self.content {
                apply_at_path(root, &path, value);
            }
        }
        Ok(())
    }
}

/// A patch proposed to the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPatch {
    #[serde(rename = "_id")]
    pub document_id: DocumentId,
    #[serde(flatten)]
    pub updates: BTreeMap<String, SheetValue>,
}

impl DocumentPatch {
    pub fn new(document_id: DocumentId) -> Self {
        Self {
            document_id,
            updates: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, path: impl Into<String>, value: SheetValue) {
        self.updates.insert(path.into(), value);
    }

    pub fn get(&self, path: &str) -> Option<&SheetValue> {
        self.updates.get(path)
    }
}

/// Sentinel key that deletes `key` when applied.
pub fn deletion_key(key: &str) -> String {
    format!("{}{}", DELETION_PREFIX, key)
}

fn apply_at_path(root: &mut BTreeMap<String, SheetValue>, path: &FieldPath, value: &SheetValue) {
    let segments: Vec<&str> = path.segments().collect();
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };

    let mut node = root;
    for segment in parents {
        let child = node
            .entry((*segment).to_string())
            .or_insert_with(SheetValue::object);
        if child.as_object().is_none() {
            *child = SheetValue::object();
        }
        let SheetValue::Object(map) = child else {
            return;
        };
        node = map;
    }
    apply_entry(node, leaf, value);
}

fn apply_entry(map: &mut BTreeMap<String, SheetValue>, key: &str, value: &SheetValue) {
    if let Some(target) = key.strip_prefix(DELETION_PREFIX) {
        if value.is_null() {
            map.remove(target);
            return;
        }
    }

    match value {
        SheetValue::Object(incoming) => {
            let slot = map.entry(key.to_string()).or_insert_with(SheetValue::object);
            if slot.as_object().is_none() {
                *slot = SheetValue::object();
            }
            if let SheetValue::Object(existing) = slot {
                for (child_key, child_value) in incoming {
                    apply_entry(existing, child_key, child_value);
                }
            }
        }
        _ => {
            map.insert(key.to_string(), value.clone());
        }
    }
}
