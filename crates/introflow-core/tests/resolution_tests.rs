use introflow_core::{ResolutionSource, StepOutcome, TemplateResolver};
use introflow_model::{TemplateId, Ticket, UserIdentity};
use introflow_registry::{CacheConfig, CachedRegistry, InMemoryRegistry, TemplateAdmin};
use introflow_test_utils::{
    standard_registry, FaultyRegistry, Operation, HAZMAT_EMAIL, PRICING_EMPLOYEE,
};
use std::sync::Arc;

fn resolver() -> TemplateResolver {
    TemplateResolver::new(Arc::new(standard_registry()))
}

async fn resolved_id(
    resolver: &TemplateResolver,
    ticket: &Ticket,
    identity: &UserIdentity,
) -> Option<TemplateId> {
    resolver
        .resolve(ticket, identity)
        .await
        .map(|r| r.template.id)
}

#[tokio::test]
async fn test_stored_template_beats_user_and_default() {
    let ticket = Ticket::new("T-1").with_template("prefixed");
    let resolved = resolver()
        .resolve(&ticket, &UserIdentity::email(HAZMAT_EMAIL))
        .await
        .unwrap();

    assert_eq!(resolved.template.id, TemplateId::from("prefixed"));
    assert_eq!(resolved.source, ResolutionSource::Stored);
    assert_eq!(resolved.form.id.as_str(), "base-form");
}

#[tokio::test]
async fn test_inactive_stored_template_falls_through_to_user() {
    let ticket = Ticket::new("T-1").with_template("retired");
    let resolved = resolver()
        .resolve(&ticket, &UserIdentity::email(HAZMAT_EMAIL))
        .await
        .unwrap();

    assert_eq!(resolved.template.id, TemplateId::from("hazardous"));
    assert_eq!(resolved.source, ResolutionSource::AssignedUser);
}

#[tokio::test]
async fn test_unknown_stored_template_falls_through() {
    let ticket = Ticket::new("T-1").with_template("never-existed");
    let id = resolved_id(&resolver(), &ticket, &UserIdentity::anonymous()).await;
    assert_eq!(id, Some(TemplateId::from("standard")));
}

#[tokio::test]
async fn test_user_matched_by_employee_id_or_email() {
    let r = resolver();
    let ticket = Ticket::new("T-1");

    assert_eq!(
        resolved_id(&r, &ticket, &UserIdentity::employee(PRICING_EMPLOYEE)).await,
        Some(TemplateId::from("prefixed"))
    );
    assert_eq!(
        resolved_id(&r, &ticket, &UserIdentity::email("HAZMAT.Lead@example.com")).await,
        Some(TemplateId::from("hazardous"))
    );
}

#[tokio::test]
async fn test_user_without_assignment_gets_default() {
    let resolved = resolver()
        .resolve(&Ticket::new("T-1"), &UserIdentity::employee("E-200"))
        .await
        .unwrap();
    assert_eq!(resolved.source, ResolutionSource::RegistryDefault);
}

#[tokio::test]
async fn test_nothing_resolves_on_empty_registry() {
    let resolver = TemplateResolver::new(Arc::new(InMemoryRegistry::new()));
    let resolution = resolver
        .explain(&Ticket::new("T-1"), &UserIdentity::employee("E-1"))
        .await;

    assert!(resolution.resolved.is_none());
    assert!(resolution
        .steps
        .iter()
        .all(|s| s.outcome == StepOutcome::NotFound));
}

#[tokio::test]
async fn test_store_failure_at_each_step_degrades_to_next() {
    // stored lookup fails → user step
    let registry = Arc::new(FaultyRegistry::new(standard_registry()).failing(Operation::Template));
    let resolution = TemplateResolver::new(Arc::clone(&registry))
        .explain(&Ticket::new("T-1").with_template("hazardous"), &UserIdentity::anonymous())
        .await;
    assert!(matches!(resolution.steps[0].outcome, StepOutcome::Failed(_)));
    assert_eq!(
        resolution.resolved.map(|r| r.source),
        Some(ResolutionSource::RegistryDefault)
    );

    // every step fails → nothing, but no panic or error
    registry.fail(Operation::DefaultTemplate);
    registry.fail(Operation::FindUser);
    let resolution = TemplateResolver::new(Arc::clone(&registry))
        .explain(&Ticket::new("T-1").with_template("hazardous"), &UserIdentity::employee("E-200"))
        .await;
    assert!(resolution.resolved.is_none());
    assert_eq!(resolution.failures().count(), 3);
}

#[tokio::test]
async fn test_missing_form_continues_chain() {
    let registry = Arc::new(standard_registry());
    registry
        .save_template(introflow_model::Template::new("broken", "Broken", "no-such-form"))
        .await
        .unwrap();

    let resolution = TemplateResolver::new(registry)
        .explain(&Ticket::new("T-1").with_template("broken"), &UserIdentity::anonymous())
        .await;

    assert!(matches!(
        resolution.steps[0].outcome,
        StepOutcome::Failed(ref m) if m.contains("no-such-form")
    ));
    assert_eq!(
        resolution.resolved.map(|r| r.template.id),
        Some(TemplateId::from("standard"))
    );
}

#[tokio::test]
async fn test_default_change_through_cache_is_seen_by_next_resolution() {
    let registry = Arc::new(CachedRegistry::with_config(
        standard_registry(),
        CacheConfig::default().without_ttl(),
    ));
    let resolver = TemplateResolver::new(Arc::clone(&registry));
    let ticket = Ticket::new("T-1");

    assert_eq!(
        resolved_id(&resolver, &ticket, &UserIdentity::anonymous()).await,
        Some(TemplateId::from("standard"))
    );

    registry.set_default(&"hazardous".into()).await.unwrap();

    assert_eq!(
        resolved_id(&resolver, &ticket, &UserIdentity::anonymous()).await,
        Some(TemplateId::from("hazardous"))
    );
    assert_eq!(registry.inner().default_count(), 1);
}

#[tokio::test]
async fn test_deactivated_pin_through_cache_falls_through() {
    let registry = Arc::new(CachedRegistry::with_config(
        standard_registry(),
        CacheConfig::default().without_ttl(),
    ));
    let resolver = TemplateResolver::new(Arc::clone(&registry));
    let ticket = Ticket::new("T-1").with_template("prefixed");

    assert_eq!(
        resolved_id(&resolver, &ticket, &UserIdentity::anonymous()).await,
        Some(TemplateId::from("prefixed"))
    );

    registry.deactivate_template(&"prefixed".into()).await.unwrap();

    assert_eq!(
        resolved_id(&resolver, &ticket, &UserIdentity::anonymous()).await,
        Some(TemplateId::from("standard"))
    );
}
