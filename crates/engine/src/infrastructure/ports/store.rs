//! Document store port.

use async_trait::async_trait;
use sheetsync_domain::{Document, DocumentId, DocumentPatch};

use super::StoreError;

/// External collaborator that persists sheet documents.
///
/// `update` must honor patch-merge semantics: a key `-=<key>` whose value is
/// null removes `<key>` from the map it sits in, every other key is upserted.
/// Retrying an identical patch must be harmless.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, id: DocumentId) -> Result<Option<Document>, StoreError>;
    async fn update(&self, patch: &DocumentPatch) -> Result<(), StoreError>;
}
