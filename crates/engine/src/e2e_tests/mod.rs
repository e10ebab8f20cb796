//! End-to-end sheet sync tests.
//!
//! These tests drive the full path from row edits to the stored document:
//! - `App` composed with the standard handler registry
//! - `SheetSession` editing rows and scalars
//! - `InMemoryDocumentStore` applying patches with `-=` deletions

mod e2e_helpers;

pub use e2e_helpers::*;
