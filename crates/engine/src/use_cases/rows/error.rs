//! Row operation errors.

use sheetsync_domain::{CollectionKind, DomainError, RowId};

use crate::use_cases::session::RowAction;

/// Errors that can occur while creating, removing or rebinding rows.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RowError {
    /// The table has no row template to clone.
    #[error("Configuration error: {0} table has no row template")]
    MissingTemplate(CollectionKind),

    #[error("Row not found: {0}")]
    RowNotFound(RowId),

    #[error("Row {row} is not scoped to control '{control}'")]
    RowScopeMismatch { row: RowId, control: String },

    #[error("Handler for {0:?} received a different event")]
    UnexpectedEvent(RowAction),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}
