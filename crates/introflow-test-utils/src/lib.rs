//! Testing utilities for the introflow workspace
//!
//! Shared fixtures and a fault-injecting registry wrapper.

#![allow(missing_docs)]

use async_trait::async_trait;
use introflow_model::{
    Field, FieldKey, FieldType, FormConfiguration, FormConfigurationId, Section, Template,
    TemplateId, Ticket, User, UserIdentity, VisibleWhen,
};
use introflow_registry::{
    FormConfigurationStore, InMemoryRegistry, RegistrySnapshot, StoreError, TemplateStore,
    UserDirectory,
};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub const HAZMAT_EMAIL: &str = "hazmat.lead@example.com";
pub const PRICING_EMPLOYEE: &str = "E-100";

pub fn key(s: &str) -> FieldKey {
    s.parse().unwrap()
}

pub fn text(k: &str, label: &str) -> Field {
    Field::new(key(k), label, FieldType::Text)
}

/// Product name plus a pricing section
pub fn base_form() -> FormConfiguration {
    FormConfiguration::new("base-form", "Base product form")
        .with_section(
            Section::new("general", "General").with_field(text("productName", "Product name")),
        )
        .with_section(
            Section::new("pricing", "Pricing")
                .with_field(Field::new(key("pricing.unitPrice"), "Unit price", FieldType::Number))
                .with_field(
                    Field::new(key("pricing.currency"), "Currency", FieldType::Select)
                        .with_default(json!("EUR")),
                ),
        )
}

/// Chemical product form; the UN number only shows for hazardous goods
pub fn hazard_form() -> FormConfiguration {
    FormConfiguration::new("hazard-form", "Hazardous goods form")
        .with_section(
            Section::new("general", "General")
                .with_field(text("productName", "Product name"))
                .with_field(
                    Field::new(key("isHazardous"), "Hazardous", FieldType::Boolean)
                        .with_default(json!(false)),
                ),
        )
        .with_section(
            Section::new("chemistry", "Chemical properties")
                .with_field(text("chemicalProperties.casNumber", "CAS number"))
                .with_field(text("chemicalProperties.internalCode", "Internal code").hidden()),
        )
        .with_section(
            Section::new("regulatory", "Regulatory").with_field(
                text("regulatory.unNumber", "UN number")
                    .with_visible_when(VisibleWhen::equals(key("isHazardous"), "true")),
            ),
        )
}

/// Templates:
/// - `standard`: default, requires `productName`
/// - `hazardous`: assigned to [`HAZMAT_EMAIL`]
/// - `prefixed`: assigned to [`PRICING_EMPLOYEE`], uses an unqualified key
/// - `retired`: inactive
pub fn standard_snapshot() -> RegistrySnapshot {
    RegistrySnapshot {
        forms: vec![base_form(), hazard_form()],
        templates: vec![
            Template::new("standard", "Standard", "base-form")
                .with_requirements(["productName"])
                .as_default(),
            Template::new("hazardous", "Hazardous", "hazard-form").with_requirements([
                "productName",
                "chemicalProperties.casNumber",
                "regulatory.unNumber",
            ]),
            Template::new("prefixed", "Legacy pricing", "base-form")
                .with_requirements(["unitPrice"]),
            Template::new("retired", "Retired", "base-form")
                .with_requirements(["productName", "pricing.unitPrice"])
                .inactive(),
        ],
        users: vec![
            User::new("u-hazmat")
                .with_email(HAZMAT_EMAIL)
                .with_template("hazardous"),
            User::new("u-pricing")
                .with_employee_id(PRICING_EMPLOYEE)
                .with_template("prefixed"),
            User::new("u-plain").with_employee_id("E-200"),
        ],
    }
}

pub fn standard_registry() -> InMemoryRegistry {
    InMemoryRegistry::from_snapshot(standard_snapshot()).unwrap()
}

/// Default template points at a form that does not exist
pub fn registry_with_dangling_default() -> InMemoryRegistry {
    InMemoryRegistry::from_snapshot(RegistrySnapshot {
        forms: vec![],
        templates: vec![Template::new("orphan", "Orphan", "missing-form")
            .with_requirements(["productName"])
            .as_default()],
        users: vec![],
    })
    .unwrap()
}

/// Ticket for the hazardous template with everything but the UN number
pub fn hazardous_ticket(is_hazardous: bool) -> Ticket {
    Ticket::new("T-HAZ").with_data(json!({
        "productName": "Acetone",
        "isHazardous": is_hazardous,
        "chemicalProperties": { "casNumber": "67-64-1" }
    }))
}

/// Store operation that [`FaultyRegistry`] can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Form,
    Template,
    DefaultTemplate,
    FindUser,
}

/// Registry wrapper that fails selected reads and counts calls
#[derive(Debug)]
pub struct FaultyRegistry<R> {
    inner: R,
    failing: Mutex<HashSet<Operation>>,
    calls: Mutex<HashMap<Operation, usize>>,
}

impl<R> FaultyRegistry<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn failing(self, op: Operation) -> Self {
        self.fail(op);
        self
    }

    pub fn fail(&self, op: Operation) {
        self.failing.lock().insert(op);
    }

    pub fn recover(&self, op: Operation) {
        self.failing.lock().remove(&op);
    }

    pub fn calls(&self, op: Operation) -> usize {
        self.calls.lock().get(&op).copied().unwrap_or(0)
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    fn enter(&self, op: Operation) -> Result<(), StoreError> {
        *self.calls.lock().entry(op).or_insert(0) += 1;
        if self.failing.lock().contains(&op) {
            return Err(StoreError::Unavailable(format!("{op:?} injected failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl<R: FormConfigurationStore> FormConfigurationStore for FaultyRegistry<R> {
    async fn form(
        &self,
        id: &FormConfigurationId,
    ) -> Result<Option<Arc<FormConfiguration>>, StoreError> {
        self.enter(Operation::Form)?;
        self.inner.form(id).await
    }
}

#[async_trait]
impl<R: TemplateStore> TemplateStore for FaultyRegistry<R> {
    async fn template(&self, id: &TemplateId) -> Result<Option<Template>, StoreError> {
        self.enter(Operation::Template)?;
        self.inner.template(id).await
    }

    async fn default_template(&self) -> Result<Option<Template>, StoreError> {
        self.enter(Operation::DefaultTemplate)?;
        self.inner.default_template().await
    }

    async fn template_by_name(&self, name: &str) -> Result<Option<Template>, StoreError> {
        self.inner.template_by_name(name).await
    }

    async fn templates(&self) -> Result<Vec<Template>, StoreError> {
        self.inner.templates().await
    }
}

#[async_trait]
impl<R: UserDirectory> UserDirectory for FaultyRegistry<R> {
    async fn find_user(&self, identity: &UserIdentity) -> Result<Option<User>, StoreError> {
        self.enter(Operation::FindUser)?;
        self.inner.find_user(identity).await
    }
}
