//! Shared setup for end-to-end tests.

use std::sync::Arc;

use sheetsync_domain::{Document, DocumentId, SheetValue};

use crate::app::App;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::SyncConfig;
use crate::infrastructure::memory_store::InMemoryDocumentStore;
use crate::infrastructure::ports::DocumentStore;
use crate::use_cases::MergePolicy;

/// An application wired to an in-memory store seeded with one document.
pub struct E2ETestContext {
    pub app: App,
    pub store: Arc<InMemoryDocumentStore>,
    pub document_id: DocumentId,
}

impl E2ETestContext {
    pub async fn with_document(content: serde_json::Value) -> Self {
        Self::with_policy(content, MergePolicy::Lenient).await
    }

    pub async fn with_policy(content: serde_json::Value, merge_policy: MergePolicy) -> Self {
        let store = Arc::new(InMemoryDocumentStore::new(Arc::new(SystemClock::new())));
        let document = Document::with_content(DocumentId::new(), SheetValue::from(content))
            .expect("seed content should be an object");
        let document_id = document.id();
        store.insert(document).await;

        let config = SyncConfig {
            merge_policy,
            ..SyncConfig::default()
        };
        let app = App::new(config, store.clone()).expect("app should compose");
        Self {
            app,
            store,
            document_id,
        }
    }

    /// Stored content as JSON, for readable assertions.
    pub async fn stored(&self) -> serde_json::Value {
        let document = self
            .store
            .get(self.document_id)
            .await
            .expect("store read should succeed")
            .expect("document should exist");
        serde_json::Value::from(document.content().clone())
    }
}

/// A skill entity with every field the skill row renders.
pub fn full_skill(name: &str, stat: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "stat": stat,
        "inability": false,
        "trained": false,
        "specialized": false,
    })
}
