//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Document persistence (the external store applying sheet patches)
//! - Clock (for testing)

mod error;
mod store;
mod testing;

// =============================================================================
// Document Store Port
// =============================================================================
pub use store::DocumentStore;

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use store::MockDocumentStore;

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::StoreError;
