//! Registered row action handlers.
//!
//! Row controls are dispatched through an explicit table keyed by
//! `(CollectionKind, RowAction)` instead of being discovered from control
//! names at event time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sheetsync_domain::{CollectionKind, RowId, RowTable};

use crate::use_cases::rows::{create_row, delete_row, rebind_table_row, RebindOutcome, RowError};

/// Actions a row control can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    Create,
    Delete,
    Rename,
}

/// A UI event addressed to one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEvent {
    /// Add-row control clicked.
    Create,
    /// Delete control named `control` clicked inside `row`.
    Delete { row: RowId, control: String },
    /// Name field of `row` lost focus holding `name`.
    Rename { row: RowId, name: String },
}

impl RowEvent {
    pub fn action(&self) -> RowAction {
        match self {
            RowEvent::Create => RowAction::Create,
            RowEvent::Delete { .. } => RowAction::Delete,
            RowEvent::Rename { .. } => RowAction::Rename,
        }
    }
}

/// What the session must do after a handler ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// The change stays in the UI until the next submit.
    Pending,
    /// The change must be committed right away.
    CommitNow,
    /// A row was created.
    Created(RowId),
    /// A name edit was processed.
    Renamed(RebindOutcome),
}

impl HandlerOutcome {
    pub fn requires_commit(&self) -> bool {
        matches!(self, HandlerOutcome::CommitNow)
    }
}

pub type RowHandler =
    Arc<dyn Fn(&mut RowTable, &RowEvent) -> Result<HandlerOutcome, RowError> + Send + Sync>;

/// Explicit mapping of (collection kind, action) to handler.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<(CollectionKind, RowAction), RowHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create, delete and rename for every managed collection.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for kind in CollectionKind::ALL {
            registry.register(kind, RowAction::Create, Arc::new(handle_create));
            registry.register(kind, RowAction::Delete, Arc::new(handle_delete));
            registry.register(kind, RowAction::Rename, Arc::new(handle_rename));
        }
        registry
    }

    /// Register a handler, replacing any previous one for the same pair.
    pub fn register(&mut self, kind: CollectionKind, action: RowAction, handler: RowHandler) {
        self.handlers.insert((kind, action), handler);
    }

    pub fn get(&self, kind: CollectionKind, action: RowAction) -> Option<&RowHandler> {
        self.handlers.get(&(kind, action))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.handlers.keys().collect();
        keys.sort();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &keys)
            .finish()
    }
}

fn handle_create(table: &mut RowTable, event: &RowEvent) -> Result<HandlerOutcome, RowError> {
    match event {
        RowEvent::Create => Ok(HandlerOutcome::Created(create_row(table)?)),
        other => Err(RowError::UnexpectedEvent(other.action())),
    }
}

fn handle_delete(table: &mut RowTable, event: &RowEvent) -> Result<HandlerOutcome, RowError> {
    match event {
        RowEvent::Delete { row, control } => {
            delete_row(table, *row, control)?;
            Ok(HandlerOutcome::CommitNow)
        }
        other => Err(RowError::UnexpectedEvent(other.action())),
    }
}

fn handle_rename(table: &mut RowTable, event: &RowEvent) -> Result<HandlerOutcome, RowError> {
    match event {
        RowEvent::Rename { row, name } => Ok(HandlerOutcome::Renamed(rebind_table_row(
            table, *row, name,
        )?)),
        other => Err(RowError::UnexpectedEvent(other.action())),
    }
}
