//! Submission errors.

use sheetsync_domain::{DocumentId, DomainError};

use crate::infrastructure::ports::StoreError;
use crate::use_cases::merge::MergeError;

/// Errors that can occur while submitting a sheet form.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SubmitError {
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("Invalid form submission: {0}")]
    Form(#[from] DomainError),

    #[error("Merge rejected: {0}")]
    Merge(#[from] MergeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
