//! In-memory registry
//!
//! All state sits behind one [`RwLock`]. Every write that touches the
//! default flag runs inside a single write guard, so clearing the old
//! default and setting the new one is one transaction.

use crate::error::StoreError;
use crate::snapshot::RegistrySnapshot;
use crate::store::{FormConfigurationStore, TemplateAdmin, TemplateStore, UserDirectory};
use async_trait::async_trait;
use introflow_model::{
    FormConfiguration, FormConfigurationId, Template, TemplateId, User, UserId, UserIdentity,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct RegistryState {
    forms: HashMap<FormConfigurationId, Arc<FormConfiguration>>,
    templates: HashMap<TemplateId, Template>,
    users: Vec<User>,
}

impl RegistryState {
    fn name_taken(&self, template: &Template) -> bool {
        self.templates
            .values()
            .any(|t| t.id != template.id && t.name == template.name)
    }

    /// Clear every default except `keep`
    fn clear_defaults_except(&mut self, keep: &TemplateId) {
        for (id, template) in &mut self.templates {
            if id != keep {
                template.is_default = false;
            }
        }
    }

    fn default_count(&self) -> usize {
        self.templates.values().filter(|t| t.is_default).count()
    }
}

fn inactive_default(template: &Template) -> StoreError {
    StoreError::Conflict(format!(
        "inactive template '{}' cannot be default",
        template.name
    ))
}

/// Reference store for forms, templates and users
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    state: RwLock<RegistryState>,
}

impl InMemoryRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a snapshot, checking registry invariants
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Result<Self, StoreError> {
        let mut state = RegistryState::default();

        for form in snapshot.forms {
            form.validate_unique_keys()
                .map_err(|e| StoreError::Conflict(e.to_string()))?;
            if state.forms.contains_key(&form.id) {
                return Err(StoreError::Conflict(format!(
                    "form configuration id '{}' appears twice",
                    form.id
                )));
            }
            state.forms.insert(form.id.clone(), Arc::new(form));
        }
        for template in snapshot.templates {
            if state.templates.contains_key(&template.id) {
                return Err(StoreError::Conflict(format!(
                    "template id '{}' appears twice",
                    template.id
                )));
            }
            if state.name_taken(&template) {
                return Err(StoreError::Conflict(format!(
                    "template name '{}' already in use",
                    template.name
                )));
            }
            state.templates.insert(template.id.clone(), template);
        }
        if state.default_count() > 1 {
            return Err(StoreError::Conflict(
                "more than one template marked default".to_string(),
            ));
        }
        state.users = snapshot.users;

        tracing::debug!(
            "Loaded registry snapshot: {} forms, {} templates, {} users",
            state.forms.len(),
            state.templates.len(),
            state.users.len()
        );

        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Export current contents
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        let state = self.state.read();
        RegistrySnapshot {
            forms: state.forms.values().map(|f| (**f).clone()).collect(),
            templates: state.templates.values().cloned().collect(),
            users: state.users.clone(),
        }
    }

    /// Number of templates marked default (at most one)
    #[must_use]
    pub fn default_count(&self) -> usize {
        self.state.read().default_count()
    }
}

#[async_trait]
impl FormConfigurationStore for InMemoryRegistry {
    async fn form(
        &self,
        id: &FormConfigurationId,
    ) -> Result<Option<Arc<FormConfiguration>>, StoreError> {
        Ok(self.state.read().forms.get(id).cloned())
    }
}

#[async_trait]
impl TemplateStore for InMemoryRegistry {
    async fn template(&self, id: &TemplateId) -> Result<Option<Template>, StoreError> {
        Ok(self.state.read().templates.get(id).cloned())
    }

    async fn default_template(&self) -> Result<Option<Template>, StoreError> {
        Ok(self
            .state
            .read()
            .templates
            .values()
            .find(|t| t.is_usable_default())
            .cloned())
    }

    async fn template_by_name(&self, name: &str) -> Result<Option<Template>, StoreError> {
        Ok(self
            .state
            .read()
            .templates
            .values()
            .find(|t| t.name == name)
            .cloned())
    }

    async fn templates(&self) -> Result<Vec<Template>, StoreError> {
        let mut templates: Vec<Template> = self.state.read().templates.values().cloned().collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }
}

#[async_trait]
impl UserDirectory for InMemoryRegistry {
    async fn find_user(&self, identity: &UserIdentity) -> Result<Option<User>, StoreError> {
        if identity.is_anonymous() {
            return Ok(None);
        }
        Ok(self
            .state
            .read()
            .users
            .iter()
            .find(|u| identity.matches(u))
            .cloned())
    }
}

#[async_trait]
impl TemplateAdmin for InMemoryRegistry {
    async fn save_form(&self, form: FormConfiguration) -> Result<(), StoreError> {
        form.validate_unique_keys()
            .map_err(|e| StoreError::Conflict(e.to_string()))?;
        self.state.write().forms.insert(form.id.clone(), Arc::new(form));
        Ok(())
    }

    async fn save_template(&self, template: Template) -> Result<Template, StoreError> {
        let mut state = self.state.write();

        if state.name_taken(&template) {
            return Err(StoreError::Conflict(format!(
                "template name '{}' already in use",
                template.name
            )));
        }
        if template.is_default && !template.is_active {
            return Err(inactive_default(&template));
        }
        if template.is_default {
            state.clear_defaults_except(&template.id);
        }
        state.templates.insert(template.id.clone(), template.clone());

        tracing::debug!("Saved template {} ({})", template.name, template.id);
        Ok(template)
    }

    async fn set_default(&self, id: &TemplateId) -> Result<(), StoreError> {
        let mut state = self.state.write();

        match state.templates.get(id) {
            None => return Err(StoreError::not_found("template", id.as_str())),
            Some(t) if !t.is_active => return Err(inactive_default(t)),
            Some(_) => {}
        }

        state.clear_defaults_except(id);
        if let Some(template) = state.templates.get_mut(id) {
            template.is_default = true;
        }

        tracing::info!("Template {} is now the registry default", id);
        Ok(())
    }

    async fn deactivate_template(&self, id: &TemplateId) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let template = state
            .templates
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("template", id.as_str()))?;
        template.is_active = false;

        tracing::info!("Template {} deactivated", id);
        Ok(())
    }

    async fn save_user(&self, user: User) -> Result<(), StoreError> {
        let mut state = self.state.write();
        match state.users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user,
            None => state.users.push(user),
        }
        Ok(())
    }

    async fn assign_template(
        &self,
        user: &UserId,
        template: Option<TemplateId>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write();
        let record = state
            .users
            .iter_mut()
            .find(|u| &u.id == user)
            .ok_or_else(|| StoreError::not_found("user", user.as_str()))?;
        record.template_ref = template;
        Ok(())
    }
}
