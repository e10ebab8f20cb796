pub mod collection;
pub mod document;
pub mod error;
pub mod form;
pub mod ids;
pub mod row;
pub mod types;
pub mod value_objects;

pub use collection::{CollectionKind, FieldRole};
pub use document::{deletion_key, Document, DocumentPatch, DELETION_PREFIX};
pub use error::DomainError;
pub use form::FormData;
pub use ids::DocumentId;
pub use row::{Row, RowField, RowId, RowKey, RowTable, RowTemplate, TemplateField};
pub use types::SheetValue;
pub use value_objects::{EntityName, FieldPath, PATH_SEPARATOR};
