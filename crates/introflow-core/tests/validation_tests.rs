use introflow_core::{
    MissingField, ResolutionSource, SubmissionValidator, ValidationOutcome, ValidatorConfig,
};
use introflow_model::{Field, FieldType, FormConfiguration, Section, Template, Ticket, UserIdentity};
use introflow_registry::{InMemoryRegistry, RegistrySnapshot};
use introflow_test_utils::{key, standard_registry, FaultyRegistry, Operation, HAZMAT_EMAIL};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

fn validator() -> SubmissionValidator {
    SubmissionValidator::from_registry(Arc::new(standard_registry()), ValidatorConfig::default())
}

/// Registry whose only template is the default and requires `requirements`
fn single_template(requirements: &[&str]) -> SubmissionValidator {
    let form = FormConfiguration::new("f", "Form").with_section(
        Section::new("chem", "Chemistry")
            .with_field(Field::new(
                key("chemicalProperties.casNumber"),
                "CAS number",
                FieldType::Text,
            )),
    );
    let registry = InMemoryRegistry::from_snapshot(RegistrySnapshot {
        forms: vec![form],
        templates: vec![Template::new("t", "Only", "f")
            .with_requirements(requirements.iter().copied())
            .as_default()],
        users: vec![],
    })
    .unwrap();
    SubmissionValidator::from_registry(Arc::new(registry), ValidatorConfig::default())
}

#[tokio::test]
async fn test_no_template_is_valid() {
    let validator = SubmissionValidator::from_registry(
        Arc::new(InMemoryRegistry::new()),
        ValidatorConfig::default(),
    );
    let outcome = validator
        .validate(&Ticket::new("T-1"), &UserIdentity::anonymous())
        .await;

    assert_eq!(outcome, ValidationOutcome::fail_open());
}

#[tokio::test]
async fn test_blank_cas_number_is_missing_with_label() {
    let validator = single_template(&["chemicalProperties.casNumber"]);
    let ticket = Ticket::new("T-1").with_data(json!({ "chemicalProperties": { "casNumber": "" } }));

    let outcome = validator.validate(&ticket, &UserIdentity::anonymous()).await;

    assert!(!outcome.is_valid);
    assert_eq!(
        outcome.missing_fields,
        vec![MissingField::new("chemicalProperties.casNumber", "CAS number")]
    );
    assert_eq!(outcome.required_field_keys, vec!["chemicalProperties.casNumber"]);
    assert_eq!(outcome.source, Some(ResolutionSource::RegistryDefault));
}

#[tokio::test]
async fn test_undeclared_key_uses_raw_key_as_label() {
    let validator = single_template(&["packaging.palletType"]);
    let outcome = validator
        .validate(&Ticket::new("T-1"), &UserIdentity::anonymous())
        .await;

    assert_eq!(
        outcome.missing_fields,
        vec![MissingField::new("packaging.palletType", "packaging.palletType")]
    );
}

#[tokio::test]
async fn test_emptiness_boundary() {
    let validator = single_template(&["zero", "no", "list", "map", "blank", "nothing"]);
    let ticket = Ticket::new("T-1").with_data(json!({
        "zero": 0,
        "no": false,
        "list": [],
        "map": {},
        "blank": "   ",
        "nothing": null
    }));

    let outcome = validator.validate(&ticket, &UserIdentity::anonymous()).await;
    let missing: Vec<&str> = outcome.missing_fields.iter().map(|m| m.field_key.as_str()).collect();

    assert_eq!(missing, vec!["list", "map", "blank", "nothing"]);
}

#[tokio::test]
async fn test_user_template_requirements_apply() {
    let ticket =
        Ticket::new("T-1").with_data(json!({ "productName": "Acetone", "isHazardous": true }));
    let outcome = validator()
        .validate(&ticket, &UserIdentity::email(HAZMAT_EMAIL))
        .await;

    let missing: Vec<&str> = outcome.missing_fields.iter().map(|m| m.field_key.as_str()).collect();
    assert_eq!(missing, vec!["chemicalProperties.casNumber", "regulatory.unNumber"]);
    assert_eq!(outcome.template.map(|t| t.name), Some("Hazardous".to_string()));
}

#[tokio::test]
async fn test_malformed_requirement_is_missing_and_others_still_enforced() {
    let validator = single_template(&["productName", "pricing.unitPrice", "pricing..currency"]);
    let ticket = Ticket::new("T-1");

    let outcome = validator.validate(&ticket, &UserIdentity::anonymous()).await;

    assert!(!outcome.is_valid);
    assert!(outcome.template.is_some());
    assert_eq!(
        outcome.missing_fields,
        vec![
            MissingField::new("productName", "productName"),
            MissingField::new("pricing.unitPrice", "pricing.unitPrice"),
            MissingField::new("pricing..currency", "pricing..currency"),
        ]
    );

    let filled = Ticket::new("T-2").with_data(json!({
        "productName": "Widget",
        "pricing": { "unitPrice": 4 }
    }));
    let outcome = validator.validate(&filled, &UserIdentity::anonymous()).await;
    assert_eq!(
        outcome.missing_fields,
        vec![MissingField::new("pricing..currency", "pricing..currency")]
    );
}

#[tokio::test]
async fn test_store_outage_fails_open() {
    let registry = FaultyRegistry::new(standard_registry()).failing(Operation::DefaultTemplate);
    let validator =
        SubmissionValidator::from_registry(Arc::new(registry), ValidatorConfig::default());

    let outcome = validator
        .validate(&Ticket::new("T-1"), &UserIdentity::anonymous())
        .await;
    assert!(outcome.is_valid);
    assert!(outcome.template.is_none());
}

#[tokio::test]
async fn test_validate_many_is_independent() {
    let requests = vec![
        (
            Ticket::new("T-1").with_data(json!({ "productName": "Widget" })),
            UserIdentity::anonymous(),
        ),
        (Ticket::new("T-2"), UserIdentity::anonymous()),
        (Ticket::new("T-3").with_data(json!("not an object")), UserIdentity::anonymous()),
    ];

    let outcomes = validator().validate_many(&requests).await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_valid);
    assert!(!outcomes[1].is_valid);
    assert_eq!(outcomes[2], ValidationOutcome::fail_open());
}

#[tokio::test]
async fn test_outcome_wire_format() {
    let validator = single_template(&["chemicalProperties.casNumber"]);
    let outcome = validator
        .validate(&Ticket::new("T-1"), &UserIdentity::anonymous())
        .await;

    let wire = serde_json::to_value(&outcome).unwrap();
    assert_eq!(wire["isValid"], json!(false));
    assert_eq!(wire["template"]["name"], json!("Only"));
    assert_eq!(wire["requiredFieldKeys"], json!(["chemicalProperties.casNumber"]));
    assert_eq!(wire["missingFields"][0]["fieldLabel"], json!("CAS number"));
}

fn leaf_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[ a-z]{0,6}".prop_map(Value::String),
        Just(json!([])),
        Just(json!({})),
    ]
}

proptest! {
    #[test]
    fn prop_validate_is_idempotent(
        name in leaf_value(),
        cas in leaf_value(),
        hazardous in leaf_value(),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let validator = validator();
        let ticket = Ticket::new("T-P").with_template("hazardous").with_data(json!({
            "productName": name,
            "isHazardous": hazardous,
            "chemicalProperties": { "casNumber": cas }
        }));
        let before = ticket.clone();

        let first = rt.block_on(validator.validate(&ticket, &UserIdentity::anonymous()));
        let second = rt.block_on(validator.validate(&ticket, &UserIdentity::anonymous()));

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&ticket, &before);
        prop_assert_eq!(first.is_valid, first.missing_fields.is_empty());
    }
}
