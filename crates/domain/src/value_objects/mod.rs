//! Validated value objects.

mod entity_name;
mod field_path;

pub use entity_name::EntityName;
pub use field_path::{FieldPath, PATH_SEPARATOR};
