//! Submission assembly.
//!
//! Builds the final patch: the document identity, one finished map per
//! managed collection, and every raw path outside those collections,
//! untouched. Raw per-row paths of a managed collection never reach the
//! patch, so they cannot be applied verbatim next to the keyed form.

use sheetsync_domain::{DocumentId, DocumentPatch, FormData};

use super::merge::MergedCollection;

/// Composes raw submissions and merged collections into a document patch.
pub struct SubmissionAssembler;

impl SubmissionAssembler {
    pub fn assemble(
        document_id: DocumentId,
        raw: &FormData,
        merged: &[MergedCollection],
    ) -> DocumentPatch {
        let remaining = merged
            .iter()
            .fold(raw.clone(), |form, collection| {
                form.without_prefix(&collection.collection)
            });

        let mut patch = DocumentPatch::new(document_id);
        for collection in merged {
            patch.set(collection.collection.as_str(), collection.to_value());
        }
        for (path, value) in remaining {
            patch.updates.entry(path).or_insert(value);
        }

        tracing::debug!(
            document_id = %document_id,
            collections = merged.len(),
            paths = patch.updates.len(),
            "Assembled submission patch"
        );
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::merge::{KeyedCollectionMerger, MergePolicy};
    use serde_json::json;
    use sheetsync_domain::{Document, SheetValue};

    #[test]
    fn replaces_row_paths_with_keyed_maps_and_keeps_scalars() {
        let id = DocumentId::new();
        let document = Document::with_content(
            id,
            SheetValue::from(json!({"data": {"skills": {"Old": {"name": "Old"}}}})),
        )
        .unwrap();
        let raw = FormData::from(json!({
            "name": "Kira",
            "data.might.pool": 10,
            "data.skills.0.name": "Climbing",
            "data.skills.0.stat": "Speed",
        }));

        let merger = KeyedCollectionMerger::new("data", MergePolicy::Lenient).unwrap();
        let outcome = merger
            .merge_submission(&raw.expand().unwrap(), &document)
            .unwrap();
        let patch = SubmissionAssembler::assemble(id, &raw, &outcome.collections);

        assert_eq!(patch.document_id, id);
        assert_eq!(
            patch.get("data.skills"),
            Some(&SheetValue::from(json!({
                "Climbing": {"name": "Climbing", "stat": "Speed"},
                "-=Old": null,
            })))
        );
        assert_eq!(patch.get("data.weapons"), Some(&SheetValue::object()));
        assert_eq!(patch.get("data.abilities"), Some(&SheetValue::object()));
        assert_eq!(patch.get("name"), Some(&SheetValue::from("Kira")));
        assert_eq!(patch.get("data.might.pool"), Some(&SheetValue::Integer(10)));
        assert!(patch.get("data.skills.0.name").is_none());
        assert!(patch.get("data.skills.0.stat").is_none());
    }

    #[test]
    fn applied_patch_leaves_exactly_current_minus_deleted_plus_new() {
        let id = DocumentId::new();
        let mut document = Document::with_content(
            id,
            SheetValue::from(json!({
                "name": "Kira",
                "data": {"skills": {
                    "A": {"name": "A", "stat": "Speed"},
                    "B": {"name": "B", "stat": "Might"},
                }},
            })),
        )
        .unwrap();
        let raw = FormData::from(json!({
            "name": "Kira Vale",
            "data.skills.B.name": "B",
            "data.skills.B.stat": "Might",
            "data.skills.0.name": "C",
            "data.skills.0.stat": "Intellect",
        }));

        let merger = KeyedCollectionMerger::new("data", MergePolicy::Lenient).unwrap();
        let outcome = merger
            .merge_submission(&raw.expand().unwrap(), &document)
            .unwrap();
        let patch = SubmissionAssembler::assemble(id, &raw, &outcome.collections);
        document.apply(&patch).unwrap();

        assert_eq!(
            document.content(),
            &SheetValue::from(json!({
                "name": "Kira Vale",
                "data": {
                    "skills": {
                        "B": {"name": "B", "stat": "Might"},
                        "C": {"name": "C", "stat": "Intellect"},
                    },
                    "weapons": {},
                    "abilities": {},
                },
            }))
        );
    }
}
