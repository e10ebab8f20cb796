//! Merge errors.

use sheetsync_domain::{CollectionKind, EntityName};

/// Errors raised while keying a submitted collection.
///
/// `EmptyName`, `UnaddressableName` and `DuplicateName` are only raised
/// under the strict policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("{kind} row '{row}' has content but no name")]
    EmptyName { kind: CollectionKind, row: String },

    #[error("{kind} name '{name}' contains the path separator")]
    UnaddressableName {
        kind: CollectionKind,
        name: EntityName,
    },

    #[error("{kind} name '{name}' is used by more than one row")]
    DuplicateName {
        kind: CollectionKind,
        name: EntityName,
    },

    #[error("{kind} submission at '{row}' is not an entity object")]
    NotAnEntity { kind: CollectionKind, row: String },
}
