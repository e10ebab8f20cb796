//! Sheet view preparation.
//!
//! Renders a document into the rows and scalar fields a form shows. The
//! rendering vocabulary is passed in explicitly and handed back untouched;
//! nothing in the synchronization path reads it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sheetsync_domain::{CollectionKind, Document, FormData, RowTable};

use super::session::SessionError;

/// Labels and option lists used when drawing the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SheetConfig {
    pub stats: Vec<String>,
    pub skill_levels: Vec<String>,
    pub weapon_categories: Vec<String>,
    pub damage_track: Vec<String>,
    pub labels: BTreeMap<String, String>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            stats: owned(&["Might", "Speed", "Intellect"]),
            skill_levels: owned(&["Inability", "Practiced", "Trained", "Specialized"]),
            weapon_categories: owned(&["Light", "Medium", "Heavy"]),
            damage_track: owned(&["Hale", "Impaired", "Debilitated", "Dead"]),
            labels: BTreeMap::new(),
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Everything a form needs to render one document.
#[derive(Debug, Clone, Serialize)]
pub struct SheetView {
    pub config: SheetConfig,
    pub tables: BTreeMap<CollectionKind, RowTable>,
    pub scalars: FormData,
}

/// Render `document` with every managed collection as a table of rows bound
/// to their keys.
pub fn prepare_view(
    document: &Document,
    root: &str,
    config: &SheetConfig,
) -> Result<SheetView, SessionError> {
    let (tables, scalars) = render(document, root)?;
    Ok(SheetView {
        config: config.clone(),
        tables,
        scalars,
    })
}

/// Split a document into one row table per managed collection and the
/// remaining scalar fields.
pub(crate) fn render(
    document: &Document,
    root: &str,
) -> Result<(BTreeMap<CollectionKind, RowTable>, FormData), SessionError> {
    let empty = BTreeMap::new();
    let mut tables = BTreeMap::new();
    let mut scalars = FormData::flatten(document.content());
    for kind in CollectionKind::ALL {
        let entities = document.collection_of(root, kind).unwrap_or(&empty);
        let table = RowTable::from_collection(root, kind, entities)?;
        scalars = scalars.without_prefix(table.collection());
        tables.insert(kind, table);
    }
    Ok((tables, scalars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sheetsync_domain::{DocumentId, FieldRole, SheetValue};

    #[test]
    fn rows_are_sorted_by_name_and_bound_to_keys() {
        let document = Document::with_content(
            DocumentId::new(),
            SheetValue::from(json!({
                "name": "Kira",
                "data": {"abilities": {
                    "Onslaught": {"name": "Onslaught", "cost": {"amount": 1, "pool": "Intellect"}},
                    "Bash": {"name": "Bash", "cost": {"amount": 1, "pool": "Might"}},
                }},
            })),
        )
        .unwrap();

        let view = prepare_view(&document, "data", &SheetConfig::default()).unwrap();

        let abilities = &view.tables[&CollectionKind::Ability];
        let names: Vec<_> = abilities.rows().iter().filter_map(|r| r.name_value()).collect();
        assert_eq!(names, vec!["Bash", "Onslaught"]);
        let pool = abilities.rows()[1].field(FieldRole::CostPool).unwrap();
        assert_eq!(pool.path.as_str(), "data.abilities.Onslaught.cost.pool");
        assert_eq!(pool.value, SheetValue::from("Intellect"));
        assert_eq!(view.scalars.get("name"), Some(&SheetValue::from("Kira")));
        assert!(view.tables[&CollectionKind::Skill].is_empty());
    }

    #[test]
    fn config_is_passed_through_unchanged() {
        let config: SheetConfig = serde_json::from_value(json!({
            "stats": ["Grit"],
            "labels": {"skills": "Talents"},
        }))
        .unwrap();
        let document = Document::new(DocumentId::new());

        let view = prepare_view(&document, "data", &config).unwrap();

        assert_eq!(view.config, config);
        assert_eq!(view.config.stats, vec!["Grit".to_string()]);
        assert_eq!(view.config.damage_track, SheetConfig::default().damage_track);
    }
}
