//! introflow Registry
//!
//! Read interfaces the resolution engine consumes, plus the write side that
//! administrators use to author templates.
//!
//! # Core Concepts
//!
//! - [`FormConfigurationStore`], [`TemplateStore`], [`UserDirectory`]: read traits
//! - [`TemplateAdmin`]: write trait; setting a default is a single transaction
//! - [`InMemoryRegistry`]: reference store guarded by one write lock
//! - [`CachedRegistry`]: moka-backed read cache, invalidated on every admin write
//!
//! # Example
//!
//! ```rust,ignore
//! use introflow_registry::{InMemoryRegistry, TemplateAdmin, TemplateStore};
//! use introflow_model::Template;
//!
//! let registry = InMemoryRegistry::new();
//! registry.save_template(Template::new("a", "Standard", "form-1")).await?;
//! registry.save_template(Template::new("b", "Hazardous", "form-2")).await?;
//!
//! registry.set_default(&"b".into()).await?;
//! assert!(!registry.template(&"a".into()).await?.unwrap().is_default);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod error;
pub mod memory;
pub mod snapshot;
pub mod store;

// Re-exports
pub use cache::{CacheConfig, CacheStats, CachedRegistry};
pub use error::StoreError;
pub use memory::InMemoryRegistry;
pub use snapshot::RegistrySnapshot;
pub use store::{FormConfigurationStore, Registry, TemplateAdmin, TemplateStore, UserDirectory};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
