//! Application state and composition.

use std::sync::Arc;

use sheetsync_domain::{DocumentId, DomainError};

use crate::infrastructure::config::SyncConfig;
use crate::infrastructure::ports::DocumentStore;
use crate::use_cases::{
    prepare_view, HandlerRegistry, KeyedCollectionMerger, SessionError, SheetConfig,
    SheetSession, SheetView, SubmitSheet,
};

/// Main application state.
///
/// One `SubmitSheet` is shared by every session so submissions for the same
/// document queue behind the same lock.
pub struct App {
    pub config: SyncConfig,
    pub store: Arc<dyn DocumentStore>,
    pub registry: Arc<HandlerRegistry>,
    pub submit: Arc<SubmitSheet>,
}

impl App {
    /// Compose the application with the standard row handlers.
    pub fn new(config: SyncConfig, store: Arc<dyn DocumentStore>) -> Result<Self, DomainError> {
        Self::with_registry(config, store, HandlerRegistry::standard())
    }

    pub fn with_registry(
        config: SyncConfig,
        store: Arc<dyn DocumentStore>,
        registry: HandlerRegistry,
    ) -> Result<Self, DomainError> {
        let merger = KeyedCollectionMerger::new(&config.root, config.merge_policy)?;
        let submit = Arc::new(SubmitSheet::new(store.clone(), merger));

        tracing::info!(
            root = %config.root,
            merge_policy = %config.merge_policy,
            handlers = registry.len(),
            "Composed sheet sync application"
        );

        Ok(Self {
            config,
            store,
            registry: Arc::new(registry),
            submit,
        })
    }

    /// Open an editing session on the stored document.
    pub async fn open_session(&self, document_id: DocumentId) -> Result<SheetSession, SessionError> {
        let document = self.submit.current(document_id).await?;
        SheetSession::open(
            &document,
            self.config.root.clone(),
            self.registry.clone(),
            self.submit.clone(),
        )
    }

    /// Render the stored document for display.
    pub async fn view(
        &self,
        document_id: DocumentId,
        sheet: &SheetConfig,
    ) -> Result<SheetView, SessionError> {
        let document = self.submit.current(document_id).await?;
        prepare_view(&document, &self.config.root, sheet)
    }
}
