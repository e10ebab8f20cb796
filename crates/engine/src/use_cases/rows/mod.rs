//! Row lifecycle.
//!
//! Creates rows from a table's template and detaches rows on delete.
//! Creating a row never submits: an empty row is ignored by the merger.
//! Deleting one must be followed by a commit, which the session performs
//! when the delete handler reports it.

mod error;
mod rebind;

pub use error::RowError;
pub use rebind::{rebind_row, rebind_table_row, RebindOutcome};

use sheetsync_domain::{FieldPath, Row, RowField, RowId, RowKey, RowTable};

/// Clone the table's template into a new row at the end of the table body.
///
/// The new row is addressed by its transient id until it gets a name.
///
/// # Errors
///
/// Returns `RowError::MissingTemplate` if the table has no template. The
/// table is left untouched.
pub fn create_row(table: &mut RowTable) -> Result<RowId, RowError> {
    let template = table
        .template()
        .cloned()
        .ok_or(RowError::MissingTemplate(table.kind()))?;

    let id = table.allocate_id();
    let key = RowKey::Pending(id);
    let segment = key.segment();
    let fields = template
        .fields
        .into_iter()
        .map(|slot| {
            Ok(RowField {
                role: slot.role,
                path: FieldPath::for_field(table.collection(), &segment, slot.role)?,
                value: slot.default,
            })
        })
        .collect::<Result<Vec<_>, RowError>>()?;

    table.append(Row::new(id, table.marker(), key, fields));

    tracing::debug!(
        collection = %table.kind(),
        row_id = %id,
        rows = table.len(),
        "Created row from template"
    );
    Ok(id)
}

/// Detach the row the control belongs to.
///
/// `control` is the control name of the clicked delete button; the row is
/// only detached if it carries that row-scope marker.
///
/// # Errors
///
/// - `RowError::RowNotFound` if the row is not in the table.
/// - `RowError::RowScopeMismatch` if the row is not scoped to `control`.
pub fn delete_row(table: &mut RowTable, row_id: RowId, control: &str) -> Result<Row, RowError> {
    let row = table.row(row_id).ok_or(RowError::RowNotFound(row_id))?;
    if row.marker() != control {
        return Err(RowError::RowScopeMismatch {
            row: row_id,
            control: control.to_string(),
        });
    }

    let row = table
        .detach(row_id)
        .ok_or(RowError::RowNotFound(row_id))?;

    tracing::debug!(
        collection = %table.kind(),
        row_id = %row_id,
        key = %row.key().segment(),
        "Detached row"
    );
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetsync_domain::{CollectionKind, FieldRole, SheetValue};

    #[test]
    fn create_appends_empty_row_with_pending_paths() {
        let mut table = RowTable::standard("data", CollectionKind::Skill).unwrap();
        create_row(&mut table).unwrap();
        let id = create_row(&mut table).unwrap();

        assert_eq!(table.len(), 2);
        let row = table.rows().last().unwrap();
        assert_eq!(row.id(), id);
        assert_eq!(row.key(), &RowKey::Pending(id));
        assert_eq!(row.marker(), "skill");
        assert_eq!(row.name_value(), Some(""));
        let stat = row.field(FieldRole::Stat).unwrap();
        assert_eq!(stat.path.as_str(), "data.skills.1.stat");
        assert_eq!(
            row.field(FieldRole::Trained).unwrap().value,
            SheetValue::Boolean(false)
        );
    }

    #[test]
    fn create_without_template_is_a_configuration_error() {
        let collection = FieldPath::collection("data", CollectionKind::Weapon).unwrap();
        let mut table = RowTable::new(CollectionKind::Weapon, collection, None);

        let result = create_row(&mut table);
        assert!(matches!(
            result,
            Err(RowError::MissingTemplate(CollectionKind::Weapon))
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn delete_detaches_row_matching_control() {
        let mut table = RowTable::standard("data", CollectionKind::Ability).unwrap();
        let first = create_row(&mut table).unwrap();
        let second = create_row(&mut table).unwrap();

        let removed = delete_row(&mut table, first, "ability").unwrap();
        assert_eq!(removed.id(), first);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].id(), second);
    }

    #[test]
    fn delete_rejects_foreign_control_and_unknown_rows() {
        let mut table = RowTable::standard("data", CollectionKind::Skill).unwrap();
        let id = create_row(&mut table).unwrap();

        assert!(matches!(
            delete_row(&mut table, id, "weapon"),
            Err(RowError::RowScopeMismatch { .. })
        ));
        assert!(matches!(
            delete_row(&mut table, RowId::new(99), "skill"),
            Err(RowError::RowNotFound(_))
        ));
        assert_eq!(table.len(), 1);
    }
}
