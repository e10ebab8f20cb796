//! Keyed collection merge.
//!
//! A submitted collection arrives keyed by whatever segment each row was
//! bound to (a transient row index or an entity name). The merger re-keys it
//! by the trimmed entity name and adds a `-=<key>` sentinel for every key
//! the document holds but the submission no longer does.

mod error;

pub use error::MergeError;

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sheetsync_domain::{
    deletion_key, CollectionKind, Document, DomainError, EntityName, FieldPath, FieldRole,
    SheetValue, DELETION_PREFIX,
};

/// How blank and duplicate names are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Drop rows with content but no name, let the later of two rows with
    /// the same name win. Both are recorded in the [`MergeReport`].
    #[default]
    Lenient,
    /// Reject the submission on either condition.
    Strict,
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergePolicy::Lenient => f.write_str("lenient"),
            MergePolicy::Strict => f.write_str("strict"),
        }
    }
}

impl FromStr for MergePolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(MergePolicy::Lenient),
            "strict" => Ok(MergePolicy::Strict),
            _ => Err(DomainError::parse(format!("Unknown merge policy: {}", s))),
        }
    }
}

/// A row that had content but no usable name (blank or dotted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRow {
    pub kind: CollectionKind,
    pub row: String,
}

/// A name claimed by more than one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateName {
    pub kind: CollectionKind,
    pub name: EntityName,
}

/// A persisted key the submission removes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedKey {
    pub kind: CollectionKind,
    pub key: String,
}

/// What the merge did beyond the happy path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub dropped_rows: Vec<DroppedRow>,
    pub duplicate_names: Vec<DuplicateName>,
    pub deleted: Vec<DeletedKey>,
}

impl MergeReport {
    /// No row was dropped and no name was claimed twice.
    pub fn is_clean(&self) -> bool {
        self.dropped_rows.is_empty() && self.duplicate_names.is_empty()
    }
}

/// The finished map for one collection: upserts plus deletion sentinels.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedCollection {
    pub kind: CollectionKind,
    pub collection: FieldPath,
    pub entries: BTreeMap<String, SheetValue>,
}

impl MergedCollection {
    /// Entities keyed by name, sentinels excluded.
    pub fn upserts(&self) -> impl Iterator<Item = (&String, &SheetValue)> {
        self.entries
            .iter()
            .filter(|(key, _)| !key.starts_with(DELETION_PREFIX))
    }

    /// Keys the sentinels delete.
    pub fn deletions(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .filter_map(|key| key.strip_prefix(DELETION_PREFIX))
    }

    pub fn to_value(&self) -> SheetValue {
        SheetValue::Object(self.entries.clone())
    }
}

/// Result of merging every managed collection of one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub collections: Vec<MergedCollection>,
    pub report: MergeReport,
}

/// Converts row-keyed submissions into name-keyed collection patches.
#[derive(Debug, Clone)]
pub struct KeyedCollectionMerger {
    policy: MergePolicy,
    collections: Vec<(CollectionKind, FieldPath)>,
}

impl KeyedCollectionMerger {
    /// Merger for every managed collection under `root`.
    pub fn new(root: &str, policy: MergePolicy) -> Result<Self, DomainError> {
        let collections = CollectionKind::ALL
            .iter()
            .map(|&kind| Ok((kind, FieldPath::collection(root, kind)?)))
            .collect::<Result<Vec<_>, DomainError>>()?;
        Ok(Self {
            policy,
            collections,
        })
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    pub fn collections(&self) -> impl Iterator<Item = &(CollectionKind, FieldPath)> {
        self.collections.iter()
    }

    /// Merge every managed collection of an expanded submission against the
    /// document's current keys.
    pub fn merge_submission(
        &self,
        expanded: &SheetValue,
        document: &Document,
    ) -> Result<MergeOutcome, MergeError> {
        let mut report = MergeReport::default();
        let collections = self
            .collections
            .iter()
            .map(|(kind, path)| {
                let submitted = expanded.get_path(path.as_str());
                let current = document.collection_keys(path);
                self.merge_collection(*kind, path, submitted, &current, &mut report)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MergeOutcome {
            collections,
            report,
        })
    }

    /// Key one collection by trimmed entity name and add deletion sentinels.
    ///
    /// `submitted` is the row-keyed object for the collection; `None` means
    /// the form holds no rows for it, so every current key is deleted.
    pub fn merge_collection(
        &self,
        kind: CollectionKind,
        collection: &FieldPath,
        submitted: Option<&SheetValue>,
        current_keys: &BTreeSet<String>,
        report: &mut MergeReport,
    ) -> Result<MergedCollection, MergeError> {
        let mut entries: BTreeMap<String, SheetValue> = BTreeMap::new();

        let mut rows: Vec<(&String, &SheetValue)> = match submitted {
            Some(SheetValue::Object(rows)) => rows.iter().collect(),
            Some(SheetValue::Null) | None => Vec::new(),
            Some(_) => {
                return Err(MergeError::NotAnEntity {
                    kind,
                    row: collection.to_string(),
                })
            }
        };
        rows.sort_by(|(a, _), (b, _)| row_order(a, b, current_keys));

        for (row, entity) in rows {
            if entity.as_object().is_none() {
                return Err(MergeError::NotAnEntity {
                    kind,
                    row: row.clone(),
                });
            }

            let Ok(name) = EntityName::new(name_of(entity)) else {
                if entity.is_blank() {
                    tracing::debug!(collection = %kind, row = %row, "Ignoring blank row");
                    continue;
                }
                if self.policy == MergePolicy::Strict {
                    return Err(MergeError::EmptyName {
                        kind,
                        row: row.clone(),
                    });
                }
                tracing::warn!(collection = %kind, row = %row, "Dropping row without a name");
                report.dropped_rows.push(DroppedRow {
                    kind,
                    row: row.clone(),
                });
                continue;
            };

            if !name.is_addressable() {
                if self.policy == MergePolicy::Strict {
                    return Err(MergeError::UnaddressableName { kind, name });
                }
                tracing::warn!(
                    collection = %kind,
                    name = %name,
                    row = %row,
                    "Dropping row whose name contains the path separator"
                );
                report.dropped_rows.push(DroppedRow {
                    kind,
                    row: row.clone(),
                });
                continue;
            }

            if entries.contains_key(name.as_str()) {
                if self.policy == MergePolicy::Strict {
                    return Err(MergeError::DuplicateName { kind, name });
                }
                tracing::warn!(
                    collection = %kind,
                    name = %name,
                    row = %row,
                    "Duplicate name, later row wins"
                );
                report.duplicate_names.push(DuplicateName {
                    kind,
                    name: name.clone(),
                });
            }
            entries.insert(name.into(), entity.clone());
        }

        let deletions: Vec<String> = current_keys
            .iter()
            .filter(|key| !key.starts_with(DELETION_PREFIX) && !entries.contains_key(*key))
            .cloned()
            .collect();
        for key in deletions {
            entries.insert(deletion_key(&key), SheetValue::Null);
            report.deleted.push(DeletedKey { kind, key });
        }

        let merged = MergedCollection {
            kind,
            collection: collection.clone(),
            entries,
        };
        tracing::debug!(
            collection = %kind,
            upserts = merged.upserts().count(),
            deletions = merged.deletions().count(),
            "Merged collection"
        );
        Ok(merged)
    }
}

/// Raw name of a submitted entity; non-text names are rendered as text.
fn name_of(entity: &SheetValue) -> String {
    match entity.get_path(FieldRole::Name.suffix()) {
        Some(SheetValue::String(name)) => name.clone(),
        Some(SheetValue::Integer(n)) => n.to_string(),
        Some(SheetValue::Float(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Table order: rows bound to names first, then pending rows by index.
///
/// A numeric segment the document already holds is a persisted name, not a
/// pending index.
fn row_order(a: &str, b: &str, current_keys: &BTreeSet<String>) -> Ordering {
    let index = |key: &str| {
        if current_keys.contains(key) {
            None
        } else {
            key.parse::<u64>().ok()
        }
    };
    match (index(a), index(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn skills() -> FieldPath {
        FieldPath::collection("data", CollectionKind::Skill).unwrap()
    }

    fn keys(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    fn merge(
        policy: MergePolicy,
        submitted: serde_json::Value,
        current: &[&str],
    ) -> (Result<MergedCollection, MergeError>, MergeReport) {
        let merger = KeyedCollectionMerger::new("data", policy).unwrap();
        let mut report = MergeReport::default();
        let submitted = SheetValue::from(submitted);
        let result = merger.merge_collection(
            CollectionKind::Skill,
            &skills(),
            Some(&submitted),
            &keys(current),
            &mut report,
        );
        (result, report)
    }

    #[test]
    fn keys_rows_by_trimmed_name() {
        let (result, report) = merge(
            MergePolicy::Lenient,
            json!({"0": {"name": " Climbing ", "stat": "Speed"}}),
            &[],
        );
        let merged = result.unwrap();

        assert_eq!(
            merged.to_value(),
            SheetValue::from(json!({"Climbing": {"name": " Climbing ", "stat": "Speed"}}))
        );
        assert!(report.is_clean());
    }

    #[test]
    fn missing_current_keys_become_sentinels() {
        let (result, report) = merge(
            MergePolicy::Lenient,
            json!({"B": {"name": "B", "stat": "Might"}}),
            &["A", "B"],
        );
        let merged = result.unwrap();

        assert_eq!(
            merged.to_value(),
            SheetValue::from(json!({"B": {"name": "B", "stat": "Might"}, "-=A": null}))
        );
        assert_eq!(merged.deletions().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(
            report.deleted,
            vec![DeletedKey {
                kind: CollectionKind::Skill,
                key: "A".to_string()
            }]
        );
    }

    #[test]
    fn rename_replaces_old_key_with_sentinel() {
        let (result, _) = merge(
            MergePolicy::Lenient,
            json!({"Climb": {"name": "Climb", "stat": "Speed"}}),
            &["Climbing"],
        );
        let merged = result.unwrap();

        assert_eq!(
            merged.to_value(),
            SheetValue::from(json!({"Climb": {"name": "Climb", "stat": "Speed"}, "-=Climbing": null}))
        );
        assert!(!merged.entries.contains_key("Climbing"));
    }

    #[test]
    fn keys_that_never_existed_are_never_deleted() {
        let (result, _) = merge(MergePolicy::Lenient, json!({}), &[]);
        assert!(result.unwrap().entries.is_empty());
    }

    #[test]
    fn unchanged_submission_mirrors_current_state() {
        let (result, report) = merge(
            MergePolicy::Lenient,
            json!({
                "A": {"name": "A", "stat": "Speed"},
                "B": {"name": "B", "stat": "Might"},
            }),
            &["A", "B"],
        );
        let merged = result.unwrap();

        assert_eq!(merged.deletions().count(), 0);
        assert_eq!(merged.upserts().count(), 2);
        assert!(report.deleted.is_empty());
    }

    #[test]
    fn duplicate_names_last_row_wins_under_lenient_policy() {
        // Last-write-wins is the lenient behavior, kept for compatibility;
        // the strict policy rejects this submission instead.
        let (result, report) = merge(
            MergePolicy::Lenient,
            json!({
                "0": {"name": "X", "stat": "Speed"},
                "1": {"name": "X ", "stat": "Might"},
            }),
            &[],
        );
        let merged = result.unwrap();

        assert_eq!(merged.entries.len(), 1);
        assert_eq!(
            merged.entries.get("X"),
            Some(&SheetValue::from(json!({"name": "X ", "stat": "Might"})))
        );
        assert_eq!(report.duplicate_names.len(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn rows_follow_numeric_index_order() {
        let (result, _) = merge(
            MergePolicy::Lenient,
            json!({
                "10": {"name": "X", "stat": "late"},
                "2": {"name": "X", "stat": "early"},
            }),
            &[],
        );
        assert_eq!(
            result.unwrap().entries.get("X").and_then(|e| e.get_path("stat")),
            Some(&SheetValue::from("late"))
        );
    }

    #[test]
    fn new_rows_win_over_rows_bound_to_names() {
        let (result, _) = merge(
            MergePolicy::Lenient,
            json!({
                "0": {"name": "Climbing", "stat": "new"},
                "Climbing": {"name": "Climbing", "stat": "old"},
            }),
            &["Climbing"],
        );
        let merged = result.unwrap();
        assert_eq!(
            merged.entries.get("Climbing").and_then(|e| e.get_path("stat")),
            Some(&SheetValue::from("new"))
        );
        assert_eq!(merged.deletions().count(), 0);
    }

    #[test]
    fn persisted_numeric_keys_order_with_named_rows() {
        let (result, report) = merge(
            MergePolicy::Lenient,
            json!({
                "0": {"name": "7", "stat": "new"},
                "7": {"name": "7", "stat": "old"},
                "3": {"name": "3", "stat": "Might"},
            }),
            &["3", "7"],
        );
        let merged = result.unwrap();

        assert_eq!(
            merged.entries.get("7").and_then(|e| e.get_path("stat")),
            Some(&SheetValue::from("new"))
        );
        assert!(merged.entries.contains_key("3"));
        assert_eq!(merged.deletions().count(), 0);
        assert_eq!(report.duplicate_names.len(), 1);
    }

    #[test]
    fn blank_rows_are_ignored_and_named_less_rows_dropped() {
        let (result, report) = merge(
            MergePolicy::Lenient,
            json!({
                "0": {"name": "", "stat": "", "trained": false},
                "1": {"name": "  ", "stat": "Speed"},
                "2": {"name": "Swim", "stat": "Might"},
            }),
            &[],
        );
        let merged = result.unwrap();

        assert_eq!(merged.entries.keys().collect::<Vec<_>>(), vec!["Swim"]);
        assert_eq!(
            report.dropped_rows,
            vec![DroppedRow {
                kind: CollectionKind::Skill,
                row: "1".to_string()
            }]
        );
    }

    #[test]
    fn strict_policy_rejects_ambiguity() {
        let (result, _) = merge(
            MergePolicy::Strict,
            json!({"0": {"name": "", "stat": "Speed"}}),
            &[],
        );
        assert!(matches!(result, Err(MergeError::EmptyName { .. })));

        let (result, _) = merge(
            MergePolicy::Strict,
            json!({"0": {"name": "X"}, "1": {"name": "X"}}),
            &[],
        );
        assert!(matches!(result, Err(MergeError::DuplicateName { .. })));

        let (result, _) = merge(
            MergePolicy::Strict,
            json!({"0": {"name": "", "stat": "", "trained": false}}),
            &[],
        );
        assert!(result.unwrap().entries.is_empty());
    }

    #[test]
    fn dotted_names_cannot_become_keys() {
        let (result, report) = merge(
            MergePolicy::Lenient,
            json!({"0": {"name": "Lvl.2", "stat": "Speed"}}),
            &[],
        );
        assert!(result.unwrap().entries.is_empty());
        assert_eq!(report.dropped_rows.len(), 1);

        let (result, _) = merge(
            MergePolicy::Strict,
            json!({"0": {"name": "Lvl.2"}}),
            &[],
        );
        assert!(matches!(result, Err(MergeError::UnaddressableName { .. })));
    }

    #[test]
    fn scalar_rows_are_rejected() {
        let (result, _) = merge(MergePolicy::Lenient, json!({"0": "Climbing"}), &[]);
        assert!(matches!(result, Err(MergeError::NotAnEntity { .. })));
    }

    #[test]
    fn missing_collection_deletes_everything_persisted() {
        let merger = KeyedCollectionMerger::new("data", MergePolicy::Lenient).unwrap();
        let mut report = MergeReport::default();
        let merged = merger
            .merge_collection(
                CollectionKind::Skill,
                &skills(),
                None,
                &keys(&["A"]),
                &mut report,
            )
            .unwrap();

        assert_eq!(merged.to_value(), SheetValue::from(json!({"-=A": null})));
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!("Strict".parse::<MergePolicy>().unwrap(), MergePolicy::Strict);
        assert_eq!("lenient".parse::<MergePolicy>().unwrap(), MergePolicy::Lenient);
        assert!("loose".parse::<MergePolicy>().is_err());
    }
}
