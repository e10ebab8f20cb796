//! Dotted submission paths.
//!
//! Every editable field is submitted under an identifier of the form
//! `<root>.<collection>.<entityKeyOrIndex>.<fieldRole>`. The role part may
//! itself span several segments (`cost.pool`).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::collection::{CollectionKind, FieldRole};
use crate::error::DomainError;

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '.';

/// A validated dotted path with no empty segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath(String);

impl FieldPath {
    pub fn parse(path: impl Into<String>) -> Result<Self, DomainError> {
        let path = path.into();
        if path.is_empty() || path.split(PATH_SEPARATOR).any(str::is_empty) {
            return Err(DomainError::parse(format!(
                "Invalid field path '{}': empty segment",
                path
            )));
        }
        Ok(Self(path))
    }

    /// Path of a collection inside the form root, e.g. `data.skills`.
    pub fn collection(root: &str, kind: CollectionKind) -> Result<Self, DomainError> {
        Self::parse(format!("{}{}{}", root, PATH_SEPARATOR, kind.segment()))
    }

    /// Path of one field of one entity, e.g. `data.skills.Climbing.stat`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `key` contains the separator,
    /// since it would expand into nested objects instead of a single key.
    pub fn for_field(
        collection: &FieldPath,
        key: &str,
        role: FieldRole,
    ) -> Result<Self, DomainError> {
        if key.contains(PATH_SEPARATOR) {
            return Err(DomainError::validation(format!(
                "Key '{}' cannot be used as a path segment",
                key
            )));
        }
        Self::parse(format!(
            "{}{sep}{}{sep}{}",
            collection.0,
            key,
            role.suffix(),
            sep = PATH_SEPARATOR
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(PATH_SEPARATOR)
    }

    /// Whether `self` equals `prefix` or lies underneath it.
    pub fn is_within(&self, prefix: &FieldPath) -> bool {
        self.0 == prefix.0
            || (self.0.starts_with(&prefix.0)
                && self.0[prefix.0.len()..].starts_with(PATH_SEPARATOR))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> String {
        path.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_field_paths_with_nested_roles() {
        let skills = FieldPath::collection("data", CollectionKind::Skill).unwrap();
        let stat = FieldPath::for_field(&skills, "Climbing", FieldRole::Stat).unwrap();
        assert_eq!(stat.as_str(), "data.skills.Climbing.stat");

        let abilities = FieldPath::collection("data", CollectionKind::Ability).unwrap();
        let pool = FieldPath::for_field(&abilities, "Bash", FieldRole::CostPool).unwrap();
        assert_eq!(pool.as_str(), "data.abilities.Bash.cost.pool");
    }

    #[test]
    fn rejects_empty_segments_and_dotted_keys() {
        assert!(FieldPath::parse("data..skills").is_err());
        assert!(FieldPath::parse("").is_err());

        let skills = FieldPath::collection("data", CollectionKind::Skill).unwrap();
        assert!(FieldPath::for_field(&skills, "a.b", FieldRole::Name).is_err());
    }

    #[test]
    fn containment_respects_segment_boundaries() {
        let skills = FieldPath::parse("data.skills").unwrap();
        assert!(FieldPath::parse("data.skills.0.name").unwrap().is_within(&skills));
        assert!(FieldPath::parse("data.skills").unwrap().is_within(&skills));
        assert!(!FieldPath::parse("data.skillset.0").unwrap().is_within(&skills));
    }
}
