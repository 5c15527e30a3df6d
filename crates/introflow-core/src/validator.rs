//! Submission validation
//!
//! Checks that every field a template requires is filled in. The public
//! entry point [`SubmissionValidator::validate`] never fails: internal faults
//! are logged and collapse to a permissive outcome so a broken registry
//! cannot block submissions.

use crate::config::ValidatorConfig;
use crate::error::ValidationFault;
use crate::resolver::{ResolutionSource, ResolvedTemplate, TemplateResolver};
use futures::future::join_all;
use introflow_model::{value, FieldKey, Template, Ticket, UserIdentity};
use introflow_registry::Registry;
use introflow_visibility::{is_visible, VisibilityMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// A required field with no value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingField {
    /// Key as written in the template's requirements
    pub field_key: String,
    /// Label from the form configuration, or the key itself
    pub field_label: String,
}

impl MissingField {
    /// Create missing field entry
    pub fn new(field_key: impl Into<String>, field_label: impl Into<String>) -> Self {
        Self {
            field_key: field_key.into(),
            field_label: field_label.into(),
        }
    }
}

/// Result of validating one ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    /// No required field is missing
    pub is_valid: bool,
    /// Missing fields, in requirement order
    pub missing_fields: Vec<MissingField>,
    /// Governing template, if one resolved
    pub template: Option<Template>,
    /// Requirements that were checked
    pub required_field_keys: Vec<String>,
    /// Step that produced the template
    #[serde(skip)]
    pub source: Option<ResolutionSource>,
}

impl ValidationOutcome {
    /// Permissive outcome used when validation cannot run
    #[must_use]
    pub fn fail_open() -> Self {
        Self {
            is_valid: true,
            missing_fields: Vec::new(),
            template: None,
            required_field_keys: Vec::new(),
            source: None,
        }
    }
}

/// Validates ticket drafts against their governing template
#[derive(Debug)]
pub struct SubmissionValidator {
    resolver: TemplateResolver,
    config: ValidatorConfig,
}

impl SubmissionValidator {
    /// Create validator over an explicit resolver
    #[must_use]
    pub fn new(resolver: TemplateResolver, config: ValidatorConfig) -> Self {
        Self { resolver, config }
    }

    /// Create validator with the standard resolution chain
    #[must_use]
    pub fn from_registry<R: Registry + 'static>(
        registry: Arc<R>,
        config: ValidatorConfig,
    ) -> Self {
        Self::new(TemplateResolver::new(registry), config)
    }

    /// Resolver in use
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &TemplateResolver {
        &self.resolver
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate one ticket draft
    ///
    /// Never fails. A fault is logged at `error` and yields
    /// [`ValidationOutcome::fail_open`].
    pub async fn validate(&self, ticket: &Ticket, identity: &UserIdentity) -> ValidationOutcome {
        match self.try_validate(ticket, identity).await {
            Ok(outcome) => outcome,
            Err(fault) => {
                tracing::error!(
                    ticket = %ticket.id,
                    "Validation fault, allowing submission: {}",
                    fault
                );
                ValidationOutcome::fail_open()
            }
        }
    }

    /// Validate several tickets concurrently, each independently
    pub async fn validate_many(
        &self,
        requests: &[(Ticket, UserIdentity)],
    ) -> Vec<ValidationOutcome> {
        join_all(
            requests
                .iter()
                .map(|(ticket, identity)| self.validate(ticket, identity)),
        )
        .await
    }

    /// Validate, surfacing internal faults
    pub async fn try_validate(
        &self,
        ticket: &Ticket,
        identity: &UserIdentity,
    ) -> Result<ValidationOutcome, ValidationFault> {
        if !ticket.data.is_object() {
            return Err(ValidationFault::MalformedTicketData {
                found: json_type(&ticket.data),
            });
        }

        let Some(resolved) = self.resolver.resolve(ticket, identity).await else {
            tracing::debug!(ticket = %ticket.id, "No template, nothing to enforce");
            return Ok(ValidationOutcome::fail_open());
        };

        let missing_fields = self.check(ticket, &resolved);
        let ResolvedTemplate { template, source, .. } = resolved;

        tracing::debug!(
            ticket = %ticket.id,
            "Validated against {}: {} missing of {}",
            template.name,
            missing_fields.len(),
            template.submission_requirements.len()
        );

        Ok(ValidationOutcome {
            is_valid: missing_fields.is_empty(),
            missing_fields,
            required_field_keys: template.submission_requirements.clone(),
            template: Some(template),
            source: Some(source),
        })
    }

    /// Missing requirements, in requirement order
    ///
    /// A requirement that is not a valid field key addresses nothing, so it
    /// is reported missing under its raw text.
    fn check(&self, ticket: &Ticket, resolved: &ResolvedTemplate) -> Vec<MissingField> {
        let mut missing = Vec::new();

        for raw in &resolved.template.submission_requirements {
            let key = match raw.parse::<FieldKey>() {
                Ok(key) => key,
                Err(error) => {
                    tracing::warn!(
                        template = %resolved.template.id,
                        "Unresolvable requirement: {}",
                        error
                    );
                    missing.push(MissingField::new(raw.as_str(), raw.as_str()));
                    continue;
                }
            };

            let field = resolved.form.field(key.as_str());
            if self.config.skip_hidden_requirements {
                if let Some(field) = field {
                    if !is_visible(field, ticket, VisibilityMode::Edit) {
                        tracing::debug!(ticket = %ticket.id, "Skipping hidden requirement {}", key);
                        continue;
                    }
                }
            }

            if value::is_empty(self.lookup(ticket, &key)) {
                let label = field.map_or(raw.as_str(), |f| f.label.as_str());
                missing.push(MissingField::new(raw.as_str(), label));
            }
        }

        missing
    }

    /// Value for a requirement, retrying unqualified keys under legacy prefixes
    fn lookup<'t>(&self, ticket: &'t Ticket, key: &FieldKey) -> Option<&'t Value> {
        let direct = ticket.value(key);
        if !value::is_empty(direct) || key.is_qualified() || !self.config.legacy_prefix_fallback {
            return direct;
        }

        self.config
            .legacy_prefixes
            .iter()
            .filter_map(|prefix| key.with_prefix(prefix).ok())
            .map(|candidate| ticket.value(&candidate))
            .find(|found| !value::is_empty(*found))
            .unwrap_or(direct)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
