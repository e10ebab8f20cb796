//! Sheet session errors.

use sheetsync_domain::{CollectionKind, DomainError, FieldRole, RowId};

use super::RowAction;
use crate::use_cases::rows::RowError;
use crate::use_cases::submit::SubmitError;

/// Errors that can occur while editing a sheet session.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("No handler registered for {action:?} on {kind}")]
    NoHandler {
        kind: CollectionKind,
        action: RowAction,
    },

    #[error("No {0} table in this session")]
    TableNotFound(CollectionKind),

    #[error("Row {row} has no {role} field")]
    FieldNotFound { row: RowId, role: FieldRole },

    #[error("Row error: {0}")]
    Row(#[from] RowError),

    #[error("Submit error: {0}")]
    Submit(#[from] SubmitError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}
