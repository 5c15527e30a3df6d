//! Field visibility predicate
//!
//! Decides whether a field is currently shown (and therefore enforceable)
//! given a source of live values. Both the submission validator and the
//! renderer call into this module; neither keeps its own copy of the rules.

use crate::lookup::ValueLookup;
use introflow_model::{Field, VisibilityPredicate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Evaluation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisibilityMode {
    /// Live editing of a concrete ticket
    #[default]
    Edit,
    /// Read-only display; conditions still apply
    Readonly,
    /// Full template catalog; conditions ignored
    PreviewAll,
}

/// Whether `field` is visible
///
/// # Rules
/// 1. Authoring flag off → hidden, regardless of mode
/// 2. [`VisibilityMode::PreviewAll`] → visible, conditions ignored
/// 3. No condition, or a condition without a predicate → visible
/// 4. Otherwise the dependent field's current value must satisfy the predicate
///    (see [`matches_condition`])
#[must_use]
pub fn is_visible<L>(field: &Field, lookup: &L, mode: VisibilityMode) -> bool
where
    L: ValueLookup + ?Sized,
{
    if !field.visible {
        return false;
    }
    if mode == VisibilityMode::PreviewAll {
        return true;
    }

    let Some(condition) = &field.visible_when else {
        return true;
    };
    let Some(predicate) = condition.predicate() else {
        return true;
    };

    let current = lookup.lookup(&condition.dependent_field_key);
    let current = current.as_deref();

    match predicate {
        VisibilityPredicate::AnyOf(accepted) => {
            accepted.iter().any(|expected| matches_condition(expected, current))
        }
        VisibilityPredicate::Equals(expected) => matches_condition(expected, current),
    }
}

/// Compare one configured value against the current value
///
/// A configured `"true"` / `"false"` string switches to boolean comparison:
/// the current value counts as `true` only when it is `true` or `"true"`;
/// anything else, including a missing value, counts as `false`.
/// Otherwise values compare as JSON, with numbers compared numerically.
#[must_use]
pub fn matches_condition(expected: &Value, current: Option<&Value>) -> bool {
    if let Some(flag) = boolean_literal(expected) {
        return coerce_bool(current) == flag;
    }
    current.is_some_and(|current| json_eq(expected, current))
}

fn boolean_literal(value: &Value) -> Option<bool> {
    match value.as_str() {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}

fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}
