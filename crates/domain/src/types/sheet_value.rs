use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A JSON-like value stored in a sheet document or submitted through a form.
///
/// `Null` doubles as the deletion marker paired with `-=` keys in a patch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum SheetValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    List(Vec<SheetValue>),
    Object(BTreeMap<String, SheetValue>),
    #[default]
    Null,
}

impl SheetValue {
    pub fn object() -> Self {
        SheetValue::Object(BTreeMap::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SheetValue::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, SheetValue>> {
        match self {
            SheetValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut BTreeMap<String, SheetValue>> {
        match self {
            SheetValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SheetValue::Null)
    }

    /// Whether the value carries no user input.
    ///
    /// Null, whitespace-only strings, `false`, and empty or all-blank
    /// containers are blank. Numbers never are.
    pub fn is_blank(&self) -> bool {
        match self {
            SheetValue::Null => true,
            SheetValue::Boolean(value) => !value,
            SheetValue::String(value) => value.trim().is_empty(),
            SheetValue::List(items) => items.iter().all(SheetValue::is_blank),
            SheetValue::Object(map) => map.values().all(SheetValue::is_blank),
            SheetValue::Integer(_) | SheetValue::Float(_) => false,
        }
    }

    /// Follow a relative dotted suffix such as `cost.pool` into nested objects.
    pub fn get_path(&self, suffix: &str) -> Option<&SheetValue> {
        suffix
            .split('.')
            .try_fold(self, |value, segment| value.as_object()?.get(segment))
    }
}

impl From<serde_json::Value> for SheetValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => SheetValue::Null,
            serde_json::Value::Bool(b) => SheetValue::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => SheetValue::Integer(i),
                None => SheetValue::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => SheetValue::String(s),
            serde_json::Value::Array(items) => {
                SheetValue::List(items.into_iter().map(SheetValue::from).collect())
            }
            serde_json::Value::Object(map) => SheetValue::Object(
                map.into_iter()
                    .map(|(key, value)| (key, SheetValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<SheetValue> for serde_json::Value {
    fn from(value: SheetValue) -> Self {
        match value {
            SheetValue::Null => serde_json::Value::Null,
            SheetValue::Boolean(b) => serde_json::Value::Bool(b),
            SheetValue::Integer(i) => serde_json::Value::from(i),
            // Non-finite floats have no JSON form
            SheetValue::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            SheetValue::String(s) => serde_json::Value::String(s),
            SheetValue::List(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            SheetValue::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, serde_json::Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for SheetValue {
    fn from(value: &str) -> Self {
        SheetValue::String(value.to_string())
    }
}

impl From<String> for SheetValue {
    fn from(value: String) -> Self {
        SheetValue::String(value)
    }
}

impl From<bool> for SheetValue {
    fn from(value: bool) -> Self {
        SheetValue::Boolean(value)
    }
}

impl From<i64> for SheetValue {
    fn from(value: i64) -> Self {
        SheetValue::Integer(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_conversion_keeps_structure() {
        let json = json!({"stat": "Speed", "trained": true, "level": 2, "cost": {"pool": null}});
        let value = SheetValue::from(json.clone());

        assert_eq!(value.get_path("stat"), Some(&SheetValue::from("Speed")));
        assert_eq!(value.get_path("cost.pool"), Some(&SheetValue::Null));
        assert_eq!(serde_json::Value::from(value), json);
    }

    #[test]
    fn serde_uses_plain_json_shape() {
        let value: SheetValue = serde_json::from_str(r#"{"name":"Climbing","rank":1.5}"#).unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.get("rank"), Some(&SheetValue::Float(1.5)));

        let text = serde_json::to_string(&value).unwrap();
        assert_eq!(text, r#"{"name":"Climbing","rank":1.5}"#);
    }

    #[test]
    fn blankness_ignores_defaults_but_not_numbers() {
        assert!(SheetValue::from("   ").is_blank());
        assert!(SheetValue::Boolean(false).is_blank());
        assert!(SheetValue::from(json!({"cost": {"pool": "", "amount": null}})).is_blank());
        assert!(!SheetValue::Integer(0).is_blank());
        assert!(!SheetValue::from("Speed").is_blank());
    }
}
