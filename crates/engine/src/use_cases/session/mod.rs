//! Sheet editing session.
//!
//! Holds the rendered row tables and scalar fields of one document, routes
//! row control events through the handler registry and submits the form.

mod error;
mod handlers;

pub use error::SessionError;
pub use handlers::{HandlerOutcome, HandlerRegistry, RowAction, RowEvent, RowHandler};

use std::collections::BTreeMap;
use std::sync::Arc;

use sheetsync_domain::{
    CollectionKind, Document, DocumentId, FieldPath, FieldRole, FormData, RowId, RowTable,
    SheetValue,
};

use crate::use_cases::rows::RowError;
use crate::use_cases::submit::{SubmitResult, SubmitSheet};
use crate::use_cases::view::render;

/// Result of dispatching one row event.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub outcome: HandlerOutcome,
    /// Set when the handler required an immediate commit.
    pub submitted: Option<SubmitResult>,
}

/// Editable view of one document.
pub struct SheetSession {
    document_id: DocumentId,
    root: String,
    tables: BTreeMap<CollectionKind, RowTable>,
    scalars: FormData,
    registry: Arc<HandlerRegistry>,
    submitter: Arc<SubmitSheet>,
}

impl SheetSession {
    /// Render a document into row tables and scalar fields.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Domain` if `root` is not a valid path or a
    /// persisted key cannot be bound to a row.
    pub fn open(
        document: &Document,
        root: impl Into<String>,
        registry: Arc<HandlerRegistry>,
        submitter: Arc<SubmitSheet>,
    ) -> Result<Self, SessionError> {
        let mut session = Self {
            document_id: document.id(),
            root: root.into(),
            tables: BTreeMap::new(),
            scalars: FormData::new(),
            registry,
            submitter,
        };
        session.reload(document)?;
        Ok(session)
    }

    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    pub fn table(&self, kind: CollectionKind) -> Option<&RowTable> {
        self.tables.get(&kind)
    }

    pub fn scalars(&self) -> &FormData {
        &self.scalars
    }

    /// Replace every table and scalar with the document's current state.
    pub fn reload(&mut self, document: &Document) -> Result<(), SessionError> {
        let (tables, scalars) = render(document, &self.root)?;
        self.tables = tables;
        self.scalars = scalars;
        tracing::debug!(
            document_id = %self.document_id,
            rows = self.tables.values().map(RowTable::len).sum::<usize>(),
            scalars = self.scalars.len(),
            "Loaded sheet session"
        );
        Ok(())
    }

    /// Add an empty row to a table. Nothing is submitted.
    pub async fn create_row(&mut self, kind: CollectionKind) -> Result<RowId, SessionError> {
        let dispatched = self.dispatch(kind, RowEvent::Create).await?;
        match dispatched.outcome {
            HandlerOutcome::Created(id) => Ok(id),
            // Custom handlers may not report the new row.
            _ => self
                .table(kind)
                .and_then(|table| table.rows().last())
                .map(|row| row.id())
                .ok_or(SessionError::TableNotFound(kind)),
        }
    }

    /// Delete the row owning `control` and commit right away if the handler
    /// asks for it.
    pub async fn delete_row(
        &mut self,
        kind: CollectionKind,
        row: RowId,
        control: &str,
    ) -> Result<DispatchOutcome, SessionError> {
        self.dispatch(
            kind,
            RowEvent::Delete {
                row,
                control: control.to_string(),
            },
        )
        .await
    }

    /// Set one field of a row. Editing the name field rebinds the row.
    pub async fn set_field(
        &mut self,
        kind: CollectionKind,
        row: RowId,
        role: FieldRole,
        value: impl Into<SheetValue>,
    ) -> Result<Option<DispatchOutcome>, SessionError> {
        let value = value.into();
        let table = self
            .tables
            .get_mut(&kind)
            .ok_or(SessionError::TableNotFound(kind))?;
        let field = table
            .row_mut(row)
            .ok_or(SessionError::Row(RowError::RowNotFound(row)))?
            .field_mut(role)
            .ok_or(SessionError::FieldNotFound { row, role })?;
        field.value = value;

        if !role.is_name() {
            return Ok(None);
        }
        let name = match &field.value {
            SheetValue::String(name) => name.clone(),
            SheetValue::Integer(n) => n.to_string(),
            _ => String::new(),
        };
        self.dispatch(kind, RowEvent::Rename { row, name })
            .await
            .map(Some)
    }

    /// Set a non-row field by its dotted path.
    pub fn set_scalar(
        &mut self,
        path: &str,
        value: impl Into<SheetValue>,
    ) -> Result<(), SessionError> {
        let path = FieldPath::parse(path)?;
        self.scalars.insert(path.as_str(), value);
        Ok(())
    }

    /// Current flat submission: scalars plus every row field at its path.
    pub fn form_data(&self) -> FormData {
        let mut form = self.scalars.clone();
        for table in self.tables.values() {
            for row in table.rows() {
                for field in row.fields() {
                    form.insert(field.path.as_str(), field.value.clone());
                }
            }
        }
        form
    }

    /// Submit the form and re-render from the stored document.
    ///
    /// On failure the session keeps its rows so the user can retry. If the
    /// stored document cannot be read back, the rows are kept as well.
    pub async fn submit(&mut self) -> Result<SubmitResult, SessionError> {
        let result = self
            .submitter
            .execute(self.document_id, self.form_data())
            .await?;

        let document = match &result.document {
            Some(document) => Some(document.clone()),
            None => match self.submitter.current(self.document_id).await {
                Ok(document) => Some(document),
                Err(e) => {
                    tracing::warn!(
                        document_id = %self.document_id,
                        error = %e,
                        "Submitted but could not reload, keeping local rows"
                    );
                    None
                }
            },
        };
        if let Some(document) = document {
            self.reload(&document)?;
        }
        Ok(result)
    }

    /// Route an event to the handler registered for `(kind, action)`.
    ///
    /// # Errors
    ///
    /// - `SessionError::NoHandler` if no handler is registered.
    /// - `SessionError::Row` if the handler fails.
    /// - `SessionError::Submit` if the handler required a commit that failed.
    pub async fn dispatch(
        &mut self,
        kind: CollectionKind,
        event: RowEvent,
    ) -> Result<DispatchOutcome, SessionError> {
        let action = event.action();
        let handler = self
            .registry
            .get(kind, action)
            .cloned()
            .ok_or(SessionError::NoHandler { kind, action })?;
        let table = self
            .tables
            .get_mut(&kind)
            .ok_or(SessionError::TableNotFound(kind))?;

        let outcome = handler(table, &event)?;
        tracing::debug!(
            document_id = %self.document_id,
            collection = %kind,
            action = ?action,
            outcome = ?outcome,
            "Dispatched row event"
        );

        let submitted = if outcome.requires_commit() {
            Some(self.submit().await?)
        } else {
            None
        };
        Ok(DispatchOutcome { outcome, submitted })
    }
}
