//! Nested value traversal and the emptiness predicate
//!
//! Ticket data is an arbitrary JSON tree. Field keys address into it segment
//! by segment; numeric segments also index arrays.

use crate::key::FieldKey;
use serde_json::Value;

/// Follow a field key through a JSON tree
///
/// Returns `None` as soon as a segment is missing or the current node is a
/// scalar.
#[must_use]
pub fn resolve<'a>(data: &'a Value, key: &FieldKey) -> Option<&'a Value> {
    key.segments().try_fold(data, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Whether a value counts as "not filled in"
///
/// - missing or `null` → empty
/// - string that is blank after trimming → empty
/// - array with no elements → empty
/// - object with no keys → empty
/// - anything else, including `0` and `false` → not empty
#[must_use]
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Bool(_) | Value::Number(_)) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(s: &str) -> FieldKey {
        s.parse().unwrap()
    }

    #[test]
    fn resolves_nested_objects() {
        let data = json!({ "chemicalProperties": { "casNumber": "64-17-5" } });
        assert_eq!(
            resolve(&data, &key("chemicalProperties.casNumber")),
            Some(&json!("64-17-5"))
        );
        assert_eq!(resolve(&data, &key("chemicalProperties.density")), None);
    }

    #[test]
    fn resolves_array_indices() {
        let data = json!({ "packaging": { "units": [ { "size": 5 }, { "size": 20 } ] } });
        assert_eq!(resolve(&data, &key("packaging.units.1.size")), Some(&json!(20)));
        assert_eq!(resolve(&data, &key("packaging.units.7.size")), None);
        assert_eq!(resolve(&data, &key("packaging.units.first")), None);
    }

    #[test]
    fn scalar_in_the_middle_stops_traversal() {
        let data = json!({ "productName": "Ethanol" });
        assert_eq!(resolve(&data, &key("productName.length")), None);
    }

    #[test]
    fn emptiness_boundary() {
        assert!(is_empty(None));
        assert!(is_empty(Some(&json!(null))));
        assert!(is_empty(Some(&json!(""))));
        assert!(is_empty(Some(&json!("   "))));
        assert!(is_empty(Some(&json!([]))));
        assert!(is_empty(Some(&json!({}))));

        assert!(!is_empty(Some(&json!(0))));
        assert!(!is_empty(Some(&json!(false))));
        assert!(!is_empty(Some(&json!("x"))));
        assert!(!is_empty(Some(&json!([null]))));
        assert!(!is_empty(Some(&json!({ "a": null }))));
    }
}
