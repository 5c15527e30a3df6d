//! Store interfaces
//!
//! The engine only ever reads through these traits. Persistence technology is
//! someone else's concern; [`InMemoryRegistry`](crate::InMemoryRegistry) is the
//! reference implementation.

use crate::error::StoreError;
use async_trait::async_trait;
use introflow_model::{
    FormConfiguration, FormConfigurationId, Template, TemplateId, User, UserId, UserIdentity,
};
use std::sync::Arc;

/// Read access to form configurations
#[async_trait]
pub trait FormConfigurationStore: Send + Sync {
    /// Load configuration by ID
    async fn form(
        &self,
        id: &FormConfigurationId,
    ) -> Result<Option<Arc<FormConfiguration>>, StoreError>;
}

/// Read access to the template registry
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Load template by ID, active or not
    async fn template(&self, id: &TemplateId) -> Result<Option<Template>, StoreError>;

    /// The single template with `is_default && is_active`
    async fn default_template(&self) -> Result<Option<Template>, StoreError>;

    /// Load template by unique name
    async fn template_by_name(&self, name: &str) -> Result<Option<Template>, StoreError>;

    /// All templates, including deactivated ones
    async fn templates(&self) -> Result<Vec<Template>, StoreError>;
}

/// Read access to users
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find the user matching either identity key
    async fn find_user(&self, identity: &UserIdentity) -> Result<Option<User>, StoreError>;
}

/// Administrative writes
///
/// Implementations must make [`set_default`](Self::set_default) atomic: no
/// reader, and no concurrent writer, may observe two defaults.
#[async_trait]
pub trait TemplateAdmin: Send + Sync {
    /// Insert or replace a form configuration
    async fn save_form(&self, form: FormConfiguration) -> Result<(), StoreError>;

    /// Insert or replace a template
    ///
    /// Saving with `is_default = true` clears every other default in the same
    /// write.
    async fn save_template(&self, template: Template) -> Result<Template, StoreError>;

    /// Make `id` the registry default, clearing all others
    async fn set_default(&self, id: &TemplateId) -> Result<(), StoreError>;

    /// Soft-delete a template
    async fn deactivate_template(&self, id: &TemplateId) -> Result<(), StoreError>;

    /// Insert or replace a user
    async fn save_user(&self, user: User) -> Result<(), StoreError>;

    /// Change a user's assigned template
    async fn assign_template(
        &self,
        user: &UserId,
        template: Option<TemplateId>,
    ) -> Result<(), StoreError>;
}

/// Everything template resolution reads
pub trait Registry: FormConfigurationStore + TemplateStore + UserDirectory {}

impl<T> Registry for T where T: FormConfigurationStore + TemplateStore + UserDirectory {}

#[async_trait]
impl<T: FormConfigurationStore + ?Sized> FormConfigurationStore for Arc<T> {
    async fn form(
        &self,
        id: &FormConfigurationId,
    ) -> Result<Option<Arc<FormConfiguration>>, StoreError> {
        (**self).form(id).await
    }
}

#[async_trait]
impl<T: TemplateStore + ?Sized> TemplateStore for Arc<T> {
    async fn template(&self, id: &TemplateId) -> Result<Option<Template>, StoreError> {
        (**self).template(id).await
    }

    async fn default_template(&self) -> Result<Option<Template>, StoreError> {
        (**self).default_template().await
    }

    async fn template_by_name(&self, name: &str) -> Result<Option<Template>, StoreError> {
        (**self).template_by_name(name).await
    }

    async fn templates(&self) -> Result<Vec<Template>, StoreError> {
        (**self).templates().await
    }
}

#[async_trait]
impl<T: UserDirectory + ?Sized> UserDirectory for Arc<T> {
    async fn find_user(&self, identity: &UserIdentity) -> Result<Option<User>, StoreError> {
        (**self).find_user(identity).await
    }
}

#[async_trait]
impl<T: TemplateAdmin + ?Sized> TemplateAdmin for Arc<T> {
    async fn save_form(&self, form: FormConfiguration) -> Result<(), StoreError> {
        (**self).save_form(form).await
    }

    async fn save_template(&self, template: Template) -> Result<Template, StoreError> {
        (**self).save_template(template).await
    }

    async fn set_default(&self, id: &TemplateId) -> Result<(), StoreError> {
        (**self).set_default(id).await
    }

    async fn deactivate_template(&self, id: &TemplateId) -> Result<(), StoreError> {
        (**self).deactivate_template(id).await
    }

    async fn save_user(&self, user: User) -> Result<(), StoreError> {
        (**self).save_user(user).await
    }

    async fn assign_template(
        &self,
        user: &UserId,
        template: Option<TemplateId>,
    ) -> Result<(), StoreError> {
        (**self).assign_template(user, template).await
    }
}
