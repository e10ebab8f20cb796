//! In-memory document store.
//!
//! Applies patches with the same upsert and `-=` deletion semantics a real
//! document store provides. Used by the CLI and by end-to-end tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sheetsync_domain::{Document, DocumentId, DocumentPatch};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{ClockPort, DocumentStore, StoreError};

/// A thread-safe document store holding every document in memory.
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<DocumentId, Document>>,
    clock: Arc<dyn ClockPort>,
}

impl InMemoryDocumentStore {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Insert or replace a whole document.
    pub async fn insert(&self, document: Document) {
        self.documents
            .write()
            .await
            .insert(document.id(), document);
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        Ok(self.documents.read().await.get(&id).cloned())
    }

    async fn update(&self, patch: &DocumentPatch) -> Result<(), StoreError> {
        let mut guard = self.documents.write().await;
        let document = guard
            .get_mut(&patch.document_id)
            .ok_or_else(|| StoreError::not_found("Document", patch.document_id))?;

        // Apply to a copy so a rejected patch leaves the stored document intact.
        let mut updated = document.clone();
        updated
            .apply(patch)
            .map_err(|e| StoreError::storage("update", e))?;
        updated.touch(self.clock.now());
        *document = updated;

        tracing::debug!(
            document_id = %patch.document_id,
            paths = patch.updates.len(),
            "Applied document patch"
        );
        Ok(())
    }
}
