//! Transient table rows.
//!
//! Rows are UI-only representations of one entity under edit. They are
//! cloned from a [`RowTemplate`], carry their submission paths per field,
//! and are never persisted directly: only the values submitted under their
//! paths reach the document.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::collection::{CollectionKind, FieldRole};
use crate::error::DomainError;
use crate::types::SheetValue;
use crate::value_objects::{EntityName, FieldPath};

/// Transient row identifier, unique within one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(u64);

impl RowId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The key segment a row's field paths are currently bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RowKey {
    /// A fresh row with no name yet, addressed by its transient index.
    Pending(RowId),
    /// A row bound to an entity name.
    Named(EntityName),
}

impl RowKey {
    pub fn segment(&self) -> String {
        match self {
            RowKey::Pending(id) => id.to_string(),
            RowKey::Named(name) => name.as_str().to_string(),
        }
    }

    pub fn name(&self) -> Option<&EntityName> {
        match self {
            RowKey::Named(name) => Some(name),
            RowKey::Pending(_) => None,
        }
    }
}

/// One field slot of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateField {
    pub role: FieldRole,
    pub default: SheetValue,
}

/// Reusable structural snippet cloned for every new row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowTemplate {
    pub kind: CollectionKind,
    pub fields: Vec<TemplateField>,
}

impl RowTemplate {
    /// Standard template: every role of the kind, blank defaults.
    pub fn for_kind(kind: CollectionKind) -> Self {
        let fields = kind
            .roles()
            .iter()
            .map(|&role| TemplateField {
                role,
                default: default_for(role),
            })
            .collect();
        Self { kind, fields }
    }
}

fn default_for(role: FieldRole) -> SheetValue {
    match role {
        FieldRole::Inability | FieldRole::Trained | FieldRole::Specialized => {
            SheetValue::Boolean(false)
        }
        FieldRole::CostAmount | FieldRole::Damage => SheetValue::Null,
        _ => SheetValue::String(String::new()),
    }
}

/// A field within a row: its role, its current submission path, its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowField {
    pub role: FieldRole,
    pub path: FieldPath,
    pub value: SheetValue,
}

/// One row of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    id: RowId,
    marker: String,
    key: RowKey,
    fields: Vec<RowField>,
}

impl Row {
    pub fn new(id: RowId, marker: impl Into<String>, key: RowKey, fields: Vec<RowField>) -> Self {
        Self {
            id,
            marker: marker.into(),
            key,
            fields,
        }
    }

    pub fn id(&self) -> RowId {
        self.id
    }

    /// Row-scope marker, equal to the control name of its table.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn key(&self) -> &RowKey {
        &self.key
    }

    pub fn set_key(&mut self, key: RowKey) {
        self.key = key;
    }

    pub fn fields(&self) -> &[RowField] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [RowField] {
        &mut self.fields
    }

    pub fn field(&self, role: FieldRole) -> Option<&RowField> {
        self.fields.iter().find(|f| f.role == role)
    }

    pub fn field_mut(&mut self, role: FieldRole) -> Option<&mut RowField> {
        self.fields.iter_mut().find(|f| f.role == role)
    }

    /// Current raw value of the name field.
    pub fn name_value(&self) -> Option<&str> {
        self.field(FieldRole::Name).and_then(|f| f.value.as_str())
    }
}

/// A table of rows for one managed collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowTable {
    kind: CollectionKind,
    collection: FieldPath,
    template: Option<RowTemplate>,
    rows: Vec<Row>,
    next_row: u64,
}

impl RowTable {
    pub fn new(kind: CollectionKind, collection: FieldPath, template: Option<RowTemplate>) -> Self {
        Self {
            kind,
            collection,
            template,
            rows: Vec::new(),
            next_row: 0,
        }
    }

    /// Table with the standard template under `<root>.<segment>`.
    pub fn standard(root: &str, kind: CollectionKind) -> Result<Self, DomainError> {
        Ok(Self::new(
            kind,
            FieldPath::collection(root, kind)?,
            Some(RowTemplate::for_kind(kind)),
        ))
    }

    /// Render persisted entities into rows bound to their keys, sorted by key.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for keys that cannot be bound
    /// (blank or containing the path separator).
    pub fn from_collection(
        root: &str,
        kind: CollectionKind,
        entities: &BTreeMap<String, SheetValue>,
    ) -> Result<Self, DomainError> {
        let mut table = Self::standard(root, kind)?;
        for (key, entity) in entities {
            let name = EntityName::new(key.as_str())?;
            let id = table.allocate_id();
            let fields = kind
                .roles()
                .iter()
                .map(|&role| {
                    let value = match role {
                        FieldRole::Name => entity
                            .get_path(role.suffix())
                            .cloned()
                            .unwrap_or_else(|| SheetValue::from(key.as_str())),
                        _ => entity
                            .get_path(role.suffix())
                            .cloned()
                            .unwrap_or_else(|| default_for(role)),
                    };
                    Ok(RowField {
                        role,
                        path: FieldPath::for_field(&table.collection, name.as_str(), role)?,
                        value,
                    })
                })
                .collect::<Result<Vec<_>, DomainError>>()?;
            table.rows.push(Row::new(
                id,
                kind.control_name(),
                RowKey::Named(name),
                fields,
            ));
        }
        Ok(table)
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Collection path all row paths live under.
    pub fn collection(&self) -> &FieldPath {
        &self.collection
    }

    /// Row-scope marker shared by every row of the table.
    pub fn marker(&self) -> &'static str {
        self.kind.control_name()
    }

    pub fn template(&self) -> Option<&RowTemplate> {
        self.template.as_ref()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn row_mut(&mut self, id: RowId) -> Option<&mut Row> {
        self.rows.iter_mut().find(|r| r.id == id)
    }

    /// Reserve the next transient row id whose segment no row is bound to.
    ///
    /// Entity names may be numeric, so an id is skipped when a named row
    /// already owns the same segment.
    pub fn allocate_id(&mut self) -> RowId {
        loop {
            let id = RowId(self.next_row);
            self.next_row += 1;
            if !self.segment_taken(&id.to_string()) {
                return id;
            }
        }
    }

    /// Whether any row's fields are bound under `segment`.
    pub fn segment_taken(&self, segment: &str) -> bool {
        self.rows.iter().any(|r| r.key.segment() == segment)
    }

    /// Append a row at the end of the table body.
    pub fn append(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Remove a row from the table and return it.
    pub fn detach(&mut self, id: RowId) -> Option<Row> {
        let index = self.rows.iter().position(|r| r.id == id)?;
        Some(self.rows.remove(index))
    }
}
