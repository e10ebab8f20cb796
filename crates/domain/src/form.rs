//! Flat form submissions and their nested expansion.
//!
//! A form submits a flat mapping of dotted path strings to values.
//! [`FormData::expand`] turns it into nested objects and
//! [`FormData::flatten`] goes back. Object keys that themselves contain the
//! path separator do not survive a flatten/expand round trip.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::types::SheetValue;
use crate::value_objects::{FieldPath, PATH_SEPARATOR};

/// Flat submission: dotted path -> value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(BTreeMap<String, SheetValue>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<SheetValue>) {
        self.0.insert(path.into(), value.into());
    }

    pub fn get(&self, path: &str) -> Option<&SheetValue> {
        self.0.get(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SheetValue)> {
        self.0.iter()
    }

    /// Copy of the submission without any path equal to or below `prefix`.
    pub fn without_prefix(&self, prefix: &FieldPath) -> FormData {
        let prefix = prefix.as_str();
        FormData(
            self.0
                .iter()
                .filter(|(path, _)| !is_within(path, prefix))
                .map(|(path, value)| (path.clone(), value.clone()))
                .collect(),
        )
    }

    /// Expand dotted paths into nested objects.
    ///
    /// Object values are merged into whatever the other paths already built.
    ///
    /// # Errors
    ///
    /// - `DomainError::Parse` if a path has an empty segment.
    /// - `DomainError::PathConflict` if one path needs a segment to be an
    ///   object while another path stores a leaf value there.
    pub fn expand(&self) -> Result<SheetValue, DomainError> {
        let mut root = BTreeMap::new();
        for (path, value) in &self.0 {
            let path = FieldPath::parse(path.as_str())?;
            insert_path(&mut root, &path, value.clone())?;
        }
        Ok(SheetValue::Object(root))
    }

    /// Flatten nested objects back into dotted paths.
    ///
    /// Empty objects are kept as leaves. A non-object root yields an empty
    /// submission.
    pub fn flatten(value: &SheetValue) -> FormData {
        let mut flat = BTreeMap::new();
        if let SheetValue::Object(map) = value {
            for (key, child) in map {
                flatten_into(&mut flat, key.clone(), child);
            }
        }
        FormData(flat)
    }
}

impl FromIterator<(String, SheetValue)> for FormData {
    fn from_iter<I: IntoIterator<Item = (String, SheetValue)>>(iter: I) -> Self {
        FormData(iter.into_iter().collect())
    }
}

impl IntoIterator for FormData {
    type Item = (String, SheetValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, SheetValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<serde_json::Value> for FormData {
    fn from(value: serde_json::Value) -> Self {
        match SheetValue::from(value) {
            SheetValue::Object(map) => FormData(map),
            _ => FormData::default(),
        }
    }
}

fn is_within(path: &str, prefix: &str) -> bool {
    path == prefix
        || (path.starts_with(prefix) && path[prefix.len()..].starts_with(PATH_SEPARATOR))
}

fn insert_path(
    root: &mut BTreeMap<String, SheetValue>,
    path: &FieldPath,
    value: SheetValue,
) -> Result<(), DomainError> {
    let segments: Vec<&str> = path.segments().collect();
    let Some((leaf, parents)) = segments.split_last() else {
        return Ok(());
    };

    let mut node = root;
    for segment in parents {
        let child = node
            .entry((*segment).to_string())
            .or_insert_with(SheetValue::object);
        node = child.as_object_mut().ok_or_else(|| {
            DomainError::path_conflict(path.as_str(), format!("'{}' is not an object", segment))
        })?;
    }

    let leaf = (*leaf).to_string();
    match node.get_mut(&leaf) {
        None => {
            node.insert(leaf, value);
        }
        Some(SheetValue::Object(existing)) => match value {
            SheetValue::Object(incoming) => merge_objects(existing, incoming, path.as_str())?,
            _ => {
                return Err(DomainError::path_conflict(
                    path.as_str(),
                    "a leaf value would replace nested fields",
                ))
            }
        },
        Some(slot) => *slot = value,
    }
    Ok(())
}

fn merge_objects(
    target: &mut BTreeMap<String, SheetValue>,
    incoming: BTreeMap<String, SheetValue>,
    path: &str,
) -> Result<(), DomainError> {
    for (key, value) in incoming {
        match target.get_mut(&key) {
            Some(SheetValue::Object(existing)) => match value {
                SheetValue::Object(nested) => merge_objects(existing, nested, path)?,
                _ => {
                    return Err(DomainError::path_conflict(
                        format!("{}{}{}", path, PATH_SEPARATOR, key),
                        "a leaf value would replace nested fields",
                    ))
                }
            },
            Some(slot) => *slot = value,
            None => {
                target.insert(key, value);
            }
        }
    }
    Ok(())
}

fn flatten_into(flat: &mut BTreeMap<String, SheetValue>, prefix: String, value: &SheetValue) {
    match value {
        SheetValue::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(flat, format!("{}{}{}", prefix, PATH_SEPARATOR, key), child);
            }
        }
        _ => {
            flat.insert(prefix, value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: serde_json::Value) -> FormData {
        FormData::from(value)
    }

    #[test]
    fn expands_row_paths_into_nested_entities() {
        let data = form(json!({
            "data.skills.0.name": "Climbing",
            "data.skills.0.stat": "Speed",
            "data.abilities.1.cost.amount": 3,
            "data.might.pool": 10,
        }));

        let expanded = SheetValue::from(json!({
            "data": {
                "skills": {"0": {"name": "Climbing", "stat": "Speed"}},
                "abilities": {"1": {"cost": {"amount": 3}}},
                "might": {"pool": 10},
            }
        }));
        assert_eq!(data.expand().unwrap(), expanded);
    }

    #[test]
    fn flatten_inverts_expand() {
        let nested = SheetValue::from(json!({
            "data": {
                "skills": {"Climbing": {"name": "Climbing", "trained": true}},
                "notes": "",
                "empty": {},
            }
        }));

        let flat = FormData::flatten(&nested);
        assert_eq!(flat.get("data.skills.Climbing.trained"), Some(&SheetValue::Boolean(true)));
        assert_eq!(flat.get("data.empty"), Some(&SheetValue::object()));
        assert_eq!(flat.expand().unwrap(), nested);
    }

    #[test]
    fn object_values_merge_with_sibling_paths() {
        let data = form(json!({
            "data.skills": {"Climbing": {"stat": "Speed"}},
            "data.skills.Climbing.name": "Climbing",
        }));

        let expanded = data.expand().unwrap();
        assert_eq!(
            expanded.get_path("data.skills.Climbing"),
            Some(&SheetValue::from(json!({"name": "Climbing", "stat": "Speed"})))
        );
    }

    #[test]
    fn leaf_and_object_on_same_segment_conflict() {
        let data = form(json!({
            "data.skills": "oops",
            "data.skills.0.name": "Climbing",
        }));

        assert!(matches!(
            data.expand(),
            Err(DomainError::PathConflict { .. })
        ));
    }

    #[test]
    fn empty_segments_are_rejected() {
        let data = form(json!({"data..name": "x"}));
        assert!(matches!(data.expand(), Err(DomainError::Parse(_))));
    }

    #[test]
    fn without_prefix_drops_whole_namespace_only() {
        let data = form(json!({
            "data.skills.0.name": "Climbing",
            "data.skills": {},
            "data.skillset": 1,
            "data.might.pool": 10,
        }));

        let kept = data.without_prefix(&FieldPath::parse("data.skills").unwrap());
        assert_eq!(kept.len(), 2);
        assert!(kept.get("data.skillset").is_some());
        assert!(kept.get("data.might.pool").is_some());
    }
}
