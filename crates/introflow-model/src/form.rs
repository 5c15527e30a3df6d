//! Form configurations
//!
//! A [`FormConfiguration`] is the authored catalog of sections and fields a
//! ticket is edited through. Each [`Field`] carries an authoring-time
//! visibility flag and an optional [`VisibleWhen`] condition on another
//! field's live value.

use crate::error::ModelError;
use crate::id::FormConfigurationId;
use crate::key::FieldKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Ordered catalog of sections and fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfiguration {
    /// Configuration ID
    pub id: FormConfigurationId,
    /// Display name
    pub name: String,
    /// Sections in display order
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl FormConfiguration {
    /// Create empty configuration
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<FormConfigurationId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sections: Vec::new(),
        }
    }

    /// Append a section
    #[inline]
    #[must_use]
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Iterate every field across all sections, in order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    /// Find field by key (first match in section order)
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields().find(|f| f.field_key.as_str() == key)
    }

    /// Human-readable label for a key, if the key is declared
    #[must_use]
    pub fn label_for(&self, key: &str) -> Option<&str> {
        self.field(key).map(|f| f.label.as_str())
    }

    /// Check that no field key is declared twice
    pub fn validate_unique_keys(&self) -> Result<(), ModelError> {
        let mut seen = HashSet::new();
        for field in self.fields() {
            if !seen.insert(field.field_key.as_str()) {
                return Err(ModelError::DuplicateFieldKey {
                    key: field.field_key.to_string(),
                    form: self.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Group of fields rendered together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Section key
    pub key: String,
    /// Section heading
    pub title: String,
    /// Fields in display order
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Section {
    /// Create empty section
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field
    #[inline]
    #[must_use]
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }
}

/// Single editable field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Storage path, unique within the configuration
    pub field_key: FieldKey,
    /// Display label
    pub label: String,
    /// Input type
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Authoring-time visibility
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Conditional visibility on another field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<VisibleWhen>,
    /// Authored default, shown in read-only preview
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Layout and input validation metadata, carried opaque
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

fn default_visible() -> bool {
    true
}

impl Field {
    /// Create visible, unconditional field
    #[must_use]
    pub fn new(field_key: FieldKey, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field_key,
            label: label.into(),
            field_type,
            visible: true,
            visible_when: None,
            default_value: None,
            metadata: Value::Null,
        }
    }

    /// Mark hidden at authoring time
    #[inline]
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Attach visibility condition
    #[inline]
    #[must_use]
    pub fn with_visible_when(mut self, condition: VisibleWhen) -> Self {
        self.visible_when = Some(condition);
        self
    }

    /// Attach authored default value
    #[inline]
    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }
}

/// Field input type
///
/// Unknown type names are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Single-line text
    #[default]
    Text,
    /// Multi-line text
    Textarea,
    /// Numeric input
    Number,
    /// Checkbox / toggle
    Boolean,
    /// Single choice
    Select,
    /// Multiple choice
    MultiSelect,
    /// Calendar date
    Date,
    /// Type name not known to this crate
    Other(String),
}

impl FieldType {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Select => "select",
            Self::MultiSelect => "multiSelect",
            Self::Date => "date",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "text" => Self::Text,
            "textarea" => Self::Textarea,
            "number" => Self::Number,
            "boolean" | "checkbox" => Self::Boolean,
            "select" => Self::Select,
            "multiSelect" => Self::MultiSelect,
            "date" => Self::Date,
            _ => Self::Other(name),
        }
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

/// Visibility condition on another field's current value
///
/// Either a scalar `value` (equality) or a `values` list (membership, OR).
/// A condition with neither a non-null scalar nor a non-empty list carries
/// no predicate and never hides its field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleWhen {
    /// Field whose value controls visibility
    pub dependent_field_key: FieldKey,
    /// Scalar comparison value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Accepted values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

/// Effective comparison carried by a [`VisibleWhen`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisibilityPredicate<'a> {
    /// Current value must equal this
    Equals(&'a Value),
    /// Current value must equal any of these
    AnyOf(&'a [Value]),
}

impl VisibleWhen {
    /// Scalar equality condition
    #[must_use]
    pub fn equals(dependent_field_key: FieldKey, value: impl Into<Value>) -> Self {
        Self {
            dependent_field_key,
            value: Some(value.into()),
            values: None,
        }
    }

    /// Membership condition
    #[must_use]
    pub fn any_of<I, V>(dependent_field_key: FieldKey, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            dependent_field_key,
            value: None,
            values: Some(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Predicate to evaluate, if any
    ///
    /// A non-empty `values` list wins over a scalar `value`.
    #[must_use]
    pub fn predicate(&self) -> Option<VisibilityPredicate<'_>> {
        match (&self.values, &self.value) {
            (Some(values), _) if !values.is_empty() => Some(VisibilityPredicate::AnyOf(values)),
            (_, Some(value)) if !value.is_null() => Some(VisibilityPredicate::Equals(value)),
            _ => None,
        }
    }
}
