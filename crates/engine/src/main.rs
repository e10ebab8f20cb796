//! Sheetsync - apply one form submission to a character document.
//!
//! Usage: `sheetsync <document.json> <submission.json>`
//!
//! The document is seeded into an in-memory store, the flat submission is
//! merged and applied, then the patch and the resulting document are printed.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::de::DeserializeOwned;
use sheetsync_domain::{Document, FormData};
use sheetsync_engine::infrastructure::{
    clock::SystemClock, config::SyncConfig, memory_store::InMemoryDocumentStore,
    ports::ClockPort,
};
use sheetsync_engine::App;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetsync_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(document_path), Some(submission_path)) = (args.next(), args.next()) else {
        anyhow::bail!("usage: sheetsync <document.json> <submission.json>");
    };

    let config = SyncConfig::from_env();
    let document: Document = read_json(Path::new(&document_path))?;
    let form: FormData = read_json(Path::new(&submission_path))?;
    let document_id = document.id();

    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
    let store = Arc::new(InMemoryDocumentStore::new(clock));
    store.insert(document).await;

    let app = App::new(config, store)?;
    let result = app
        .submit
        .execute(document_id, form)
        .await
        .with_context(|| format!("submitting {} to document {}", submission_path, document_id))?;

    if !result.report.is_clean() {
        tracing::warn!(
            dropped_rows = result.report.dropped_rows.len(),
            duplicate_names = result.report.duplicate_names.len(),
            "Submission merged with warnings"
        );
    }

    println!("{}", serde_json::to_string_pretty(&result.patch)?);
    if let Some(document) = result.document {
        println!("{}", serde_json::to_string_pretty(&document)?);
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn load_dotenv_from_repo_root() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
