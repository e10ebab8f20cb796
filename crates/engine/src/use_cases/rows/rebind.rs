//! Field identity rebinding.
//!
//! When a row's name field loses focus, every field of the row must be
//! re-addressed under the new key, otherwise the next submit files the
//! values under a stale key. Fields are found by their role tag, so the
//! visual order of the row does not matter.

use sheetsync_domain::{EntityName, FieldPath, Row, RowId, RowKey, RowTable};

use super::RowError;

/// What a rebind did to the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebindOutcome {
    /// Every field path now points at the new key.
    Rebound { from: RowKey, to: EntityName },
    /// The row is already bound to this name.
    Unchanged,
    /// The name is blank; the row keeps its previous binding.
    EmptyName,
    /// The name contains the path separator and cannot be a key segment.
    Unaddressable,
}

/// Rewrite the submission paths of every field in `row` to
/// `<collection>.<new_name>.<role>`.
///
/// # Errors
///
/// Returns `RowError::Domain` if a path cannot be built. No field is
/// modified in that case.
pub fn rebind_row(
    row: &mut Row,
    collection: &FieldPath,
    new_name: &str,
) -> Result<RebindOutcome, RowError> {
    let Ok(name) = EntityName::new(new_name) else {
        return Ok(RebindOutcome::EmptyName);
    };
    if row.key().name() == Some(&name) {
        return Ok(RebindOutcome::Unchanged);
    }
    if !name.is_addressable() {
        tracing::warn!(
            row_id = %row.id(),
            name = %name,
            "Entity name contains the path separator, keeping previous binding"
        );
        return Ok(RebindOutcome::Unaddressable);
    }

    let from = row.key().clone();
    bind(row, collection, RowKey::Named(name.clone()))?;

    tracing::debug!(
        row_id = %row.id(),
        from = %from.segment(),
        to = %name,
        "Rebound row fields"
    );
    Ok(RebindOutcome::Rebound { from, to: name })
}

/// Rebind a row of `table` and move any pending row whose index segment
/// equals the new name to a fresh index, so no two rows share paths.
///
/// # Errors
///
/// - `RowError::RowNotFound` if the row is not in the table.
/// - `RowError::Domain` if a path cannot be built.
pub fn rebind_table_row(
    table: &mut RowTable,
    row_id: RowId,
    new_name: &str,
) -> Result<RebindOutcome, RowError> {
    let collection = table.collection().clone();
    let target = table
        .row_mut(row_id)
        .ok_or(RowError::RowNotFound(row_id))?;
    let outcome = rebind_row(target, &collection, new_name)?;

    if let RebindOutcome::Rebound { to, .. } = &outcome {
        let displaced: Vec<RowId> = table
            .rows()
            .iter()
            .filter(|r| r.id() != row_id && matches!(r.key(), RowKey::Pending(_)))
            .filter(|r| r.key().segment() == to.as_str())
            .map(Row::id)
            .collect();
        for id in displaced {
            let fresh = table.allocate_id();
            let row = table.row_mut(id).ok_or(RowError::RowNotFound(id))?;
            bind(row, &collection, RowKey::Pending(fresh))?;
            tracing::debug!(row_id = %id, index = %fresh, "Moved pending row off a claimed segment");
        }
    }
    Ok(outcome)
}

/// Point every field of `row` at `<collection>.<key>.<role>` and set the key.
fn bind(row: &mut Row, collection: &FieldPath, key: RowKey) -> Result<(), RowError> {
    let segment = key.segment();
    // Build every path before touching the row so a failure leaves it intact.
    let paths = row
        .fields()
        .iter()
        .map(|field| FieldPath::for_field(collection, &segment, field.role))
        .collect::<Result<Vec<_>, _>>()?;
    for (field, path) in row.fields_mut().iter_mut().zip(paths) {
        field.path = path;
    }
    row.set_key(key);
    Ok(())
}
