use introflow_core::{SubmissionError, SubmissionGate, SubmissionValidator, ValidatorConfig};
use introflow_model::{TemplateId, Ticket, TicketStatus, UserIdentity};
use introflow_registry::{FormConfigurationStore, InMemoryRegistry, TemplateAdmin, TemplateStore};
use introflow_test_utils::{hazardous_ticket, standard_registry, HAZMAT_EMAIL};
use introflow_visibility::{render, VisibilityMode};
use std::sync::Arc;

#[tokio::test]
async fn test_pinned_template_survives_reassignment() {
    let registry = Arc::new(standard_registry());
    let gate = SubmissionGate::new(SubmissionValidator::from_registry(
        Arc::clone(&registry),
        ValidatorConfig::default(),
    ));
    let hazmat = UserIdentity::email(HAZMAT_EMAIL);

    let mut ticket = hazardous_ticket(false);
    let receipt = gate.submit(&mut ticket, &hazmat).await.unwrap();
    assert_eq!(receipt.template_id, Some(TemplateId::from("hazardous")));

    // user moves to another template; the ticket stays on the pinned one
    registry.assign_template(&"u-hazmat".into(), None).await.unwrap();
    ticket.transition(TicketStatus::UnderReview).unwrap();
    ticket.transition(TicketStatus::Rejected).unwrap();
    ticket.transition(TicketStatus::Draft).unwrap();

    let outcome = gate.validator().validate(&ticket, &hazmat).await;
    assert_eq!(outcome.template.map(|t| t.id), Some(TemplateId::from("hazardous")));
}

#[tokio::test]
async fn test_rejection_lists_fields_the_form_shows() {
    let registry = Arc::new(standard_registry());
    let gate = SubmissionGate::new(SubmissionValidator::from_registry(
        Arc::clone(&registry),
        ValidatorConfig::default(),
    ));

    let mut ticket = hazardous_ticket(true).with_template("hazardous");
    let err = gate
        .submit(&mut ticket, &UserIdentity::anonymous())
        .await
        .unwrap_err();

    let SubmissionError::Incomplete { missing } = err else {
        panic!("expected incomplete submission");
    };

    // every rejected key is visible in the editor for the same data
    let template = registry.template(&"hazardous".into()).await.unwrap().unwrap();
    let form = registry
        .form(&template.form_configuration_ref)
        .await
        .unwrap()
        .unwrap();
    let plan = render(&form, &ticket, VisibilityMode::Edit);
    for field in &missing {
        assert!(plan.field(&field.field_key).is_some_and(|f| f.visible));
    }
    assert_eq!(ticket.status, TicketStatus::Draft);
}

#[tokio::test]
async fn test_no_template_submits_without_pin() {
    let registry = Arc::new(InMemoryRegistry::new());
    let gate = SubmissionGate::new(SubmissionValidator::from_registry(
        registry,
        ValidatorConfig::default(),
    ));
    let mut ticket = Ticket::new("T-1");

    let receipt = gate.submit(&mut ticket, &UserIdentity::anonymous()).await.unwrap();

    assert!(!receipt.pinned);
    assert!(receipt.template_id.is_none());
    assert!(ticket.template_ref.is_none());
    assert_eq!(ticket.status, TicketStatus::Submitted);
}
