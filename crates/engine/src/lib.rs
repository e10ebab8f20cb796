//! Sheetsync Engine library.
//!
//! Keeps form rows and a name-keyed character document in sync.
//!
//! ## Structure
//!
//! - `use_cases/` - Row lifecycle, rebinding, merging, assembly and submission
//! - `infrastructure/` - Ports, the in-memory store, clock and configuration
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

/// End-to-end tests against the in-memory document store.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
