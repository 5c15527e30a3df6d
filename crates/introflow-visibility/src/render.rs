//! Render plans for the interactive form
//!
//! A [`RenderPlan`] is the renderer's view of a form: every section and field
//! in authored order, annotated with visibility and the value to display.
//! Visibility comes from [`is_visible`](crate::is_visible), so the editing
//! surface and the submission validator cannot disagree.

use crate::evaluator::{is_visible, VisibilityMode};
use crate::lookup::{DefaultValues, ValueLookup};
use introflow_model::{FieldKey, FieldType, FormConfiguration};
use serde::Serialize;
use serde_json::Value;

/// Visibility-annotated form
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPlan {
    /// Form configuration name
    pub form: String,
    /// Mode the plan was evaluated in
    pub mode: VisibilityMode,
    /// Sections in authored order
    pub sections: Vec<RenderedSection>,
}

impl RenderPlan {
    /// Keys of every visible field
    pub fn visible_keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.sections
            .iter()
            .flat_map(|s| s.fields.iter())
            .filter(|f| f.visible)
            .map(|f| &f.field_key)
    }

    /// Rendered field by key
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&RenderedField> {
        self.sections
            .iter()
            .flat_map(|s| s.fields.iter())
            .find(|f| f.field_key.as_str() == key)
    }
}

/// Section of a render plan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSection {
    /// Section key
    pub key: String,
    /// Heading
    pub title: String,
    /// False when no field in the section is visible
    pub visible: bool,
    /// Fields in authored order
    pub fields: Vec<RenderedField>,
}

/// Field of a render plan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedField {
    /// Storage path
    pub field_key: FieldKey,
    /// Display label
    pub label: String,
    /// Input type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Outcome of the shared predicate
    pub visible: bool,
    /// Value to display
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Render `form` against live values
#[must_use]
pub fn render<L>(form: &FormConfiguration, lookup: &L, mode: VisibilityMode) -> RenderPlan
where
    L: ValueLookup + ?Sized,
{
    let sections = form
        .sections
        .iter()
        .map(|section| {
            let fields: Vec<RenderedField> = section
                .fields
                .iter()
                .map(|field| RenderedField {
                    field_key: field.field_key.clone(),
                    label: field.label.clone(),
                    field_type: field.field_type.clone(),
                    visible: is_visible(field, lookup, mode),
                    value: lookup.lookup(&field.field_key).map(std::borrow::Cow::into_owned),
                })
                .collect();
            RenderedSection {
                key: section.key.clone(),
                title: section.title.clone(),
                visible: fields.iter().any(|f| f.visible),
                fields,
            }
        })
        .collect();

    RenderPlan {
        form: form.name.clone(),
        mode,
        sections,
    }
}

/// Read-only preview without a concrete ticket
///
/// Authored default values stand in for live values, both for display and
/// as inputs to visibility conditions.
#[must_use]
pub fn preview(form: &FormConfiguration) -> RenderPlan {
    render(form, &DefaultValues::new(form), VisibilityMode::Readonly)
}

/// Full catalog: every authored-visible field, conditions ignored
#[must_use]
pub fn catalog(form: &FormConfiguration) -> RenderPlan {
    render(form, &DefaultValues::new(form), VisibilityMode::PreviewAll)
}
