//! Sheet submission use case.
//!
//! Submissions are serialized per document: reading the current keys,
//! computing deletion sentinels and applying the patch happen under one
//! per-document lock, so a delete-triggered commit racing a user submit
//! never computes deletions against a stale view of the document.

mod error;

pub use error::SubmitError;

use std::sync::Arc;

use dashmap::DashMap;
use sheetsync_domain::{Document, DocumentId, DocumentPatch, FormData};
use tokio::sync::Mutex;

use crate::infrastructure::ports::DocumentStore;
use crate::use_cases::assemble::SubmissionAssembler;
use crate::use_cases::merge::{KeyedCollectionMerger, MergeReport};

/// Result of a completed submission.
#[derive(Debug, Clone)]
pub struct SubmitResult {
    /// The patch handed to the document store.
    pub patch: DocumentPatch,
    /// Dropped rows, duplicate names and deleted keys.
    pub report: MergeReport,
    /// The document as stored after the update. `None` if the store did not
    /// return it or the re-read failed.
    pub document: Option<Document>,
}

/// Turns flat form submissions into document patches and applies them.
pub struct SubmitSheet {
    store: Arc<dyn DocumentStore>,
    merger: KeyedCollectionMerger,
    locks: DashMap<DocumentId, Arc<Mutex<()>>>,
}

impl SubmitSheet {
    pub fn new(store: Arc<dyn DocumentStore>, merger: KeyedCollectionMerger) -> Self {
        Self {
            store,
            merger,
            locks: DashMap::new(),
        }
    }

    pub fn merger(&self) -> &KeyedCollectionMerger {
        &self.merger
    }

    /// Read the current document from the store.
    pub async fn current(&self, document_id: DocumentId) -> Result<Document, SubmitError> {
        self.store
            .get(document_id)
            .await?
            .ok_or(SubmitError::DocumentNotFound(document_id))
    }

    /// Submit a flat form for a document.
    ///
    /// # Arguments
    /// * `document_id` - The document the form edits
    /// * `form` - Flat path -> value submission, rows included
    ///
    /// # Returns
    /// * `Ok(SubmitResult)` - Patch applied
    /// * `Err(SubmitError)` - Nothing was applied
    pub async fn execute(
        &self,
        document_id: DocumentId,
        form: FormData,
    ) -> Result<SubmitResult, SubmitError> {
        let lock = self.lock_for(document_id);
        let result = {
            let _guard = lock.lock().await;
            self.submit_locked(document_id, &form).await
        };
        drop(lock);
        self.release_lock(document_id);
        result
    }

    async fn submit_locked(
        &self,
        document_id: DocumentId,
        form: &FormData,
    ) -> Result<SubmitResult, SubmitError> {
        // Read under the lock so deletions are computed against the latest state
        let document = self.current(document_id).await?;

        let expanded = form.expand()?;
        let outcome = self.merger.merge_submission(&expanded, &document)?;
        let patch = SubmissionAssembler::assemble(document_id, form, &outcome.collections);

        if let Err(e) = self.store.update(&patch).await {
            tracing::warn!(
                document_id = %document_id,
                error = %e,
                "Document store rejected submission"
            );
            return Err(e.into());
        }

        // The patch is already applied, so a failed re-read is not an error.
        let stored = match self.store.get(document_id).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(
                    document_id = %document_id,
                    error = %e,
                    "Failed to re-read document after submission"
                );
                None
            }
        };

        tracing::info!(
            document_id = %document_id,
            deleted = outcome.report.deleted.len(),
            dropped_rows = outcome.report.dropped_rows.len(),
            duplicate_names = outcome.report.duplicate_names.len(),
            "Submitted sheet"
        );

        Ok(SubmitResult {
            patch,
            report: outcome.report,
            document: stored,
        })
    }

    fn lock_for(&self, document_id: DocumentId) -> Arc<Mutex<()>> {
        self.locks
            .entry(document_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    /// Drop the document's lock entry once no submission holds or awaits it.
    fn release_lock(&self, document_id: DocumentId) {
        self.locks
            .remove_if(&document_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
