//! Read-through cache for templates and form configurations using moka
//!
//! Lookups change rarely, so each validation should not pay a store round
//! trip. Entries are dropped explicitly on every admin write that passes
//! through [`CachedRegistry`]; a TTL bounds staleness from writes that bypass
//! it.
//!
//! Every admin write bumps a generation counter after the store write and
//! before invalidating. A reader that loaded from the store re-checks the
//! generation after inserting and drops its own entry if a write intervened,
//! so a value read before a write can never outlive that write's
//! invalidation.

use crate::error::StoreError;
use crate::store::{FormConfigurationStore, TemplateAdmin, TemplateStore, UserDirectory};
use async_trait::async_trait;
use introflow_model::{
    FormConfiguration, FormConfigurationId, Template, TemplateId, User, UserId, UserIdentity,
};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cache sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum entries per cache
    pub max_capacity: u64,
    /// Entry time-to-live in seconds; `None` keeps entries until invalidated
    pub ttl_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1_000,
            ttl_secs: Some(300),
        }
    }
}

impl CacheConfig {
    /// With max capacity
    #[inline]
    #[must_use]
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Without time-based expiry
    #[inline]
    #[must_use]
    pub fn without_ttl(mut self) -> Self {
        self.ttl_secs = None;
        self
    }

    fn build<K, V>(&self) -> Cache<K, V>
    where
        K: std::hash::Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let builder = Cache::builder().max_capacity(self.max_capacity);
        match self.ttl_secs {
            Some(secs) => builder.time_to_live(Duration::from_secs(secs)).build(),
            None => builder.build(),
        }
    }
}

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Cached templates
    pub template_entries: u64,
    /// Cached form configurations
    pub form_entries: u64,
    /// Reads served from cache
    pub hits: u64,
    /// Reads that went to the store
    pub misses: u64,
}

/// Caching wrapper around a registry
///
/// Caches templates and forms by ID. Default and user lookups are queries and
/// always go to the store; the templates they return are cached by ID.
#[derive(Debug)]
pub struct CachedRegistry<S> {
    inner: S,
    templates: Cache<TemplateId, Template>,
    forms: Cache<FormConfigurationId, Arc<FormConfiguration>>,
    hits: AtomicU64,
    misses: AtomicU64,
    generation: AtomicU64,
}

impl<S> CachedRegistry<S> {
    /// Wrap `inner` with default sizing
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self::with_config(inner, CacheConfig::default())
    }

    /// Wrap `inner` with explicit sizing
    #[must_use]
    pub fn with_config(inner: S, config: CacheConfig) -> Self {
        Self {
            inner,
            templates: config.build(),
            forms: config.build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        }
    }

    /// Wrapped store
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop one cached template
    pub async fn invalidate_template(&self, id: &TemplateId) {
        self.templates.invalidate(id).await;
    }

    /// Drop one cached form configuration
    pub async fn invalidate_form(&self, id: &FormConfigurationId) {
        self.forms.invalidate(id).await;
    }

    /// Drop everything
    pub fn invalidate_all(&self) {
        self.templates.invalidate_all();
        self.forms.invalidate_all();
    }

    /// Current statistics
    ///
    /// Entry counts are approximate until pending maintenance has run.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            template_entries: self.templates.entry_count(),
            form_entries: self.forms.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn record(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Mark that the store changed; call after the write, before invalidating
    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Insert a value loaded at `generation`, unless a write has since landed
    async fn fill<K, V>(&self, cache: &Cache<K, V>, key: K, value: V, generation: u64)
    where
        K: std::hash::Hash + Eq + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        if self.generation() != generation {
            return;
        }
        cache.insert(key.clone(), value).await;
        // a write may have invalidated between the check and the insert
        if self.generation() != generation {
            cache.invalidate(&key).await;
        }
    }
}

#[async_trait]
impl<S: FormConfigurationStore> FormConfigurationStore for CachedRegistry<S> {
    async fn form(
        &self,
        id: &FormConfigurationId,
    ) -> Result<Option<Arc<FormConfiguration>>, StoreError> {
        if let Some(cached) = self.forms.get(id).await {
            self.record(true);
            return Ok(Some(cached));
        }
        self.record(false);

        let generation = self.generation();
        let loaded = self.inner.form(id).await?;
        if let Some(form) = &loaded {
            self.fill(&self.forms, id.clone(), Arc::clone(form), generation)
                .await;
        }
        Ok(loaded)
    }
}

#[async_trait]
impl<S: TemplateStore> TemplateStore for CachedRegistry<S> {
    async fn template(&self, id: &TemplateId) -> Result<Option<Template>, StoreError> {
        if let Some(cached) = self.templates.get(id).await {
            self.record(true);
            return Ok(Some(cached));
        }
        self.record(false);

        let generation = self.generation();
        let loaded = self.inner.template(id).await?;
        if let Some(template) = &loaded {
            self.fill(&self.templates, id.clone(), template.clone(), generation)
                .await;
        }
        Ok(loaded)
    }

    async fn default_template(&self) -> Result<Option<Template>, StoreError> {
        let generation = self.generation();
        let loaded = self.inner.default_template().await?;
        if let Some(template) = &loaded {
            self.fill(&self.templates, template.id.clone(), template.clone(), generation)
                .await;
        }
        Ok(loaded)
    }

    async fn template_by_name(&self, name: &str) -> Result<Option<Template>, StoreError> {
        self.inner.template_by_name(name).await
    }

    async fn templates(&self) -> Result<Vec<Template>, StoreError> {
        self.inner.templates().await
    }
}

#[async_trait]
impl<S: UserDirectory> UserDirectory for CachedRegistry<S> {
    async fn find_user(&self, identity: &UserIdentity) -> Result<Option<User>, StoreError> {
        self.inner.find_user(identity).await
    }
}

#[async_trait]
impl<S: TemplateAdmin> TemplateAdmin for CachedRegistry<S> {
    async fn save_form(&self, form: FormConfiguration) -> Result<(), StoreError> {
        let id = form.id.clone();
        self.inner.save_form(form).await?;
        self.bump();
        self.invalidate_form(&id).await;
        Ok(())
    }

    async fn save_template(&self, template: Template) -> Result<Template, StoreError> {
        let is_default = template.is_default;
        let saved = self.inner.save_template(template).await?;
        self.bump();
        if is_default {
            // other templates lost their default flag
            self.templates.invalidate_all();
        } else {
            self.invalidate_template(&saved.id).await;
        }
        Ok(saved)
    }

    async fn set_default(&self, id: &TemplateId) -> Result<(), StoreError> {
        self.inner.set_default(id).await?;
        self.bump();
        self.templates.invalidate_all();
        tracing::debug!("Invalidated template cache after default change");
        Ok(())
    }

    async fn deactivate_template(&self, id: &TemplateId) -> Result<(), StoreError> {
        self.inner.deactivate_template(id).await?;
        self.bump();
        self.invalidate_template(id).await;
        Ok(())
    }

    async fn save_user(&self, user: User) -> Result<(), StoreError> {
        self.inner.save_user(user).await
    }

    async fn assign_template(
        &self,
        user: &UserId,
        template: Option<TemplateId>,
    ) -> Result<(), StoreError> {
        self.inner.assign_template(user, template).await
    }
}
