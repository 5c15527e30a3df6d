//! Template resolution
//!
//! Picks the template governing a ticket by walking an ordered chain of
//! [`TemplateStrategy`] steps until one produces a usable template:
//!
//! 1. [`StoredTemplate`]: the ticket's pinned template, if still active
//! 2. [`AssignedUserTemplate`]: the acting user's assigned template, if active
//! 3. [`RegistryDefault`]: the active registry default
//!
//! A step that errors is logged and treated as "not found"; resolution
//! itself never fails.

use crate::error::{ConfigurationError, ResolutionError};
use async_trait::async_trait;
use introflow_model::{FormConfiguration, Template, Ticket, UserIdentity};
use introflow_registry::{FormConfigurationStore, Registry, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Precedence step that produced a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionSource {
    /// Template pinned on the ticket
    Stored,
    /// Template assigned to the acting user
    AssignedUser,
    /// Registry-wide default
    RegistryDefault,
}

impl ResolutionSource {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::AssignedUser => "assignedUser",
            Self::RegistryDefault => "registryDefault",
        }
    }
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Template together with its form configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTemplate {
    /// The governing template
    pub template: Template,
    /// Its form configuration
    pub form: Arc<FormConfiguration>,
    /// Step that produced it
    pub source: ResolutionSource,
}

/// One link in the resolution chain
#[async_trait]
pub trait TemplateStrategy: Send + Sync {
    /// Step this strategy implements
    fn source(&self) -> ResolutionSource;

    /// Try to produce a template
    ///
    /// `Ok(None)` passes to the next step; so does `Err`, after logging.
    async fn try_resolve(
        &self,
        ticket: &Ticket,
        identity: &UserIdentity,
    ) -> Result<Option<ResolvedTemplate>, ResolutionError>;
}

/// Attach the form configuration to an active template
async fn bind_form<S>(
    forms: &S,
    template: Template,
    source: ResolutionSource,
) -> Result<ResolvedTemplate, ResolutionError>
where
    S: FormConfigurationStore + ?Sized,
{
    let form = forms
        .form(&template.form_configuration_ref)
        .await
        .map_err(|e| ResolutionError::lookup(source, e))?
        .ok_or_else(|| ConfigurationError::MissingForm {
            template: template.id.clone(),
            form: template.form_configuration_ref.clone(),
        })?;

    Ok(ResolvedTemplate {
        template,
        form,
        source,
    })
}

/// Step 1: the template already pinned on the ticket
#[derive(Debug)]
pub struct StoredTemplate<R> {
    registry: Arc<R>,
}

impl<R> StoredTemplate<R> {
    /// Create step over `registry`
    #[must_use]
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl<R: Registry> TemplateStrategy for StoredTemplate<R> {
    fn source(&self) -> ResolutionSource {
        ResolutionSource::Stored
    }

    async fn try_resolve(
        &self,
        ticket: &Ticket,
        _identity: &UserIdentity,
    ) -> Result<Option<ResolvedTemplate>, ResolutionError> {
        let Some(template_ref) = &ticket.template_ref else {
            return Ok(None);
        };
        if template_ref.as_str().trim().is_empty() {
            return Err(ResolutionError::lookup(
                self.source(),
                StoreError::malformed(template_ref.as_str(), "blank template reference"),
            ));
        }

        let template = self
            .registry
            .template(template_ref)
            .await
            .map_err(|e| ResolutionError::lookup(self.source(), e))?;

        match template {
            Some(t) if t.is_active => bind_form(&*self.registry, t, self.source()).await.map(Some),
            Some(t) => {
                tracing::info!(
                    ticket = %ticket.id,
                    "Stored template {} is inactive, falling through",
                    t.id
                );
                Ok(None)
            }
            None => {
                tracing::warn!(
                    ticket = %ticket.id,
                    "Stored template {} not found, falling through",
                    template_ref
                );
                Ok(None)
            }
        }
    }
}

/// Step 2: the template assigned to the acting user
#[derive(Debug)]
pub struct AssignedUserTemplate<R> {
    registry: Arc<R>,
}

impl<R> AssignedUserTemplate<R> {
    /// Create step over `registry`
    #[must_use]
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl<R: Registry> TemplateStrategy for AssignedUserTemplate<R> {
    fn source(&self) -> ResolutionSource {
        ResolutionSource::AssignedUser
    }

    async fn try_resolve(
        &self,
        _ticket: &Ticket,
        identity: &UserIdentity,
    ) -> Result<Option<ResolvedTemplate>, ResolutionError> {
        if identity.is_anonymous() {
            return Ok(None);
        }

        let user = self
            .registry
            .find_user(identity)
            .await
            .map_err(|e| ResolutionError::lookup(self.source(), e))?;
        let Some(template_ref) = user.and_then(|u| u.template_ref) else {
            return Ok(None);
        };

        let template = self
            .registry
            .template(&template_ref)
            .await
            .map_err(|e| ResolutionError::lookup(self.source(), e))?;

        match template {
            Some(t) if t.is_active => bind_form(&*self.registry, t, self.source()).await.map(Some),
            _ => Ok(None),
        }
    }
}

/// Step 3: the registry-wide default
#[derive(Debug)]
pub struct RegistryDefault<R> {
    registry: Arc<R>,
}

impl<R> RegistryDefault<R> {
    /// Create step over `registry`
    #[must_use]
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl<R: Registry> TemplateStrategy for RegistryDefault<R> {
    fn source(&self) -> ResolutionSource {
        ResolutionSource::RegistryDefault
    }

    async fn try_resolve(
        &self,
        _ticket: &Ticket,
        _identity: &UserIdentity,
    ) -> Result<Option<ResolvedTemplate>, ResolutionError> {
        let template = self
            .registry
            .default_template()
            .await
            .map_err(|e| ResolutionError::lookup(self.source(), e))?;

        match template {
            Some(t) if t.is_usable_default() => {
                bind_form(&*self.registry, t, self.source()).await.map(Some)
            }
            _ => Ok(None),
        }
    }
}

/// What happened at one step of a resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome", content = "detail")]
pub enum StepOutcome {
    /// Step produced the template
    Resolved,
    /// Step had nothing to offer
    NotFound,
    /// Step failed and was skipped
    Failed(String),
}

/// Diagnostic record of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionStep {
    /// Step
    pub source: ResolutionSource,
    /// Result
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Resolution result with per-step diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Winning template, if any
    pub resolved: Option<ResolvedTemplate>,
    /// Steps attempted, in order
    pub steps: Vec<ResolutionStep>,
}

impl Resolution {
    /// Steps that failed
    pub fn failures(&self) -> impl Iterator<Item = &ResolutionStep> {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Failed(_)))
    }
}

/// Chain-of-responsibility template resolver
pub struct TemplateResolver {
    strategies: Vec<Box<dyn TemplateStrategy>>,
}

impl fmt::Debug for TemplateResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateResolver")
            .field(
                "strategies",
                &self.strategies.iter().map(|s| s.source()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl TemplateResolver {
    /// Standard chain: stored → assigned user → registry default
    #[must_use]
    pub fn new<R: Registry + 'static>(registry: Arc<R>) -> Self {
        Self::with_strategies(vec![
            Box::new(StoredTemplate::new(Arc::clone(&registry))),
            Box::new(AssignedUserTemplate::new(Arc::clone(&registry))),
            Box::new(RegistryDefault::new(registry)),
        ])
    }

    /// Custom chain, tried in the given order
    #[must_use]
    pub fn with_strategies(strategies: Vec<Box<dyn TemplateStrategy>>) -> Self {
        Self { strategies }
    }

    /// Steps in the chain, in order
    #[must_use]
    pub fn sources(&self) -> Vec<ResolutionSource> {
        self.strategies.iter().map(|s| s.source()).collect()
    }

    /// Governing template for `ticket`, or `None`
    ///
    /// Never fails: step errors are logged and skipped.
    pub async fn resolve(
        &self,
        ticket: &Ticket,
        identity: &UserIdentity,
    ) -> Option<ResolvedTemplate> {
        self.explain(ticket, identity).await.resolved
    }

    /// Resolve and report what every attempted step did
    pub async fn explain(&self, ticket: &Ticket, identity: &UserIdentity) -> Resolution {
        let mut steps = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let source = strategy.source();
            match strategy.try_resolve(ticket, identity).await {
                Ok(Some(resolved)) => {
                    tracing::debug!(
                        ticket = %ticket.id,
                        "Resolved template {} via {}",
                        resolved.template.name,
                        source
                    );
                    steps.push(ResolutionStep {
                        source,
                        outcome: StepOutcome::Resolved,
                    });
                    return Resolution {
                        resolved: Some(resolved),
                        steps,
                    };
                }
                Ok(None) => {
                    tracing::debug!(ticket = %ticket.id, "No template from {}", source);
                    steps.push(ResolutionStep {
                        source,
                        outcome: StepOutcome::NotFound,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        ticket = %ticket.id,
                        "Resolution step {} failed, continuing: {}",
                        source,
                        e
                    );
                    steps.push(ResolutionStep {
                        source,
                        outcome: StepOutcome::Failed(e.to_string()),
                    });
                }
            }
        }

        tracing::debug!(ticket = %ticket.id, "No template resolved");
        Resolution {
            resolved: None,
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use introflow_model::TemplateId;
    use introflow_test_utils::{standard_registry, FaultyRegistry, Operation};

    fn ticket() -> Ticket {
        Ticket::new("T-1")
    }

    #[tokio::test]
    async fn stored_strategy_ignores_unpinned_ticket() {
        let step = StoredTemplate::new(Arc::new(standard_registry()));
        let result = step.try_resolve(&ticket(), &UserIdentity::anonymous()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn stored_strategy_rejects_blank_reference() {
        let step = StoredTemplate::new(Arc::new(standard_registry()));
        let pinned = ticket().with_template("  ");
        let err = step
            .try_resolve(&pinned, &UserIdentity::anonymous())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::Lookup { step: ResolutionSource::Stored, .. }));
    }

    #[tokio::test]
    async fn stored_strategy_skips_inactive() {
        let step = StoredTemplate::new(Arc::new(standard_registry()));
        let pinned = ticket().with_template("retired");
        let result = step.try_resolve(&pinned, &UserIdentity::anonymous()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn user_strategy_uses_assignment() {
        let step = AssignedUserTemplate::new(Arc::new(standard_registry()));
        let resolved = step
            .try_resolve(&ticket(), &UserIdentity::email("hazmat.lead@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.template.id, TemplateId::from("hazardous"));
        assert_eq!(resolved.source, ResolutionSource::AssignedUser);
    }

    #[tokio::test]
    async fn default_strategy_reports_missing_form() {
        let registry = standard_registry();
        let step = RegistryDefault::new(Arc::new(registry));
        let resolved = step
            .try_resolve(&ticket(), &UserIdentity::anonymous())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.template.id, TemplateId::from("standard"));

        let broken = Arc::new(introflow_test_utils::registry_with_dangling_default());
        let err = RegistryDefault::new(broken)
            .try_resolve(&ticket(), &UserIdentity::anonymous())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::Configuration(_)));
    }

    #[tokio::test]
    async fn explain_records_failed_steps() {
        let registry =
            Arc::new(FaultyRegistry::new(standard_registry()).failing(Operation::FindUser));
        let resolver = TemplateResolver::new(registry);

        let resolution = resolver
            .explain(&ticket(), &UserIdentity::employee("E-100"))
            .await;

        assert_eq!(
            resolution.resolved.as_ref().map(|r| r.source),
            Some(ResolutionSource::RegistryDefault)
        );
        assert_eq!(resolution.steps.len(), 3);
        assert_eq!(resolution.failures().count(), 1);
        assert_eq!(resolution.steps[0].outcome, StepOutcome::NotFound);
    }

    #[test]
    fn default_chain_order() {
        let resolver = TemplateResolver::new(Arc::new(standard_registry()));
        assert_eq!(
            resolver.sources(),
            vec![
                ResolutionSource::Stored,
                ResolutionSource::AssignedUser,
                ResolutionSource::RegistryDefault
            ]
        );
    }

    #[test]
    fn step_serializes_with_outcome_tag() {
        let step = ResolutionStep {
            source: ResolutionSource::AssignedUser,
            outcome: StepOutcome::Failed("down".to_string()),
        };
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value["source"], "assignedUser");
        assert_eq!(value["outcome"], "failed");
        assert_eq!(value["detail"], "down");
    }
}
