//! Templates bind a form configuration to its submission requirements

use crate::id::{FormConfigurationId, TemplateId};
use serde::{Deserialize, Serialize};

/// Named binding of one form configuration plus required field keys
///
/// At most one template in a registry carries `is_default = true`; the
/// registry enforces this on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Template ID
    pub id: TemplateId,
    /// Unique display name
    pub name: String,
    /// Governing form configuration
    pub form_configuration_ref: FormConfigurationId,
    /// Registry-wide fallback template
    #[serde(default)]
    pub is_default: bool,
    /// Deactivated templates are skipped by resolution
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Field keys that must be non-empty before submission
    ///
    /// Kept as raw strings; malformed keys surface at validation time.
    #[serde(default)]
    pub submission_requirements: Vec<String>,
}

fn default_active() -> bool {
    true
}

impl Template {
    /// Create active, non-default template
    #[must_use]
    pub fn new(
        id: impl Into<TemplateId>,
        name: impl Into<String>,
        form_configuration_ref: impl Into<FormConfigurationId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            form_configuration_ref: form_configuration_ref.into(),
            is_default: false,
            is_active: true,
            submission_requirements: Vec::new(),
        }
    }

    /// Set required field keys
    #[must_use]
    pub fn with_requirements<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.submission_requirements = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Mark as registry default
    #[inline]
    #[must_use]
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Mark as deactivated
    #[inline]
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Whether this template may serve as the registry default
    #[inline]
    #[must_use]
    pub fn is_usable_default(&self) -> bool {
        self.is_default && self.is_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_defaults() {
        let t = Template::new("t1", "Standard", "form-1");
        assert!(t.is_active);
        assert!(!t.is_default);
        assert!(t.submission_requirements.is_empty());
    }

    #[test]
    fn usable_default_requires_active() {
        let t = Template::new("t1", "Standard", "form-1").as_default();
        assert!(t.is_usable_default());
        assert!(!t.inactive().is_usable_default());
    }

    #[test]
    fn deserializes_camel_case() {
        let t: Template = serde_json::from_value(json!({
            "id": "t1",
            "name": "Standard",
            "formConfigurationRef": "form-1",
            "isDefault": true,
            "submissionRequirements": ["productName"]
        }))
        .unwrap();
        assert!(t.is_default);
        assert!(t.is_active);
        assert_eq!(t.submission_requirements, vec!["productName"]);
    }
}
