//! introflow Core
//!
//! Decides which template governs a product introduction ticket and whether
//! the ticket satisfies that template's submission requirements.
//!
//! # Architecture
//!
//! ```text
//! submit ──► SubmissionGate ──► SubmissionValidator ──► TemplateResolver
//!                                      │                    │
//!                                      │             Stored → AssignedUser → RegistryDefault
//!                                      ▼
//!                          introflow-visibility (hidden fields are not enforced)
//! ```
//!
//! # Failure policy
//!
//! Resolution steps that fail are logged and skipped. Validation faults are
//! logged at `error` and the ticket is treated as valid. Only the submission
//! gate returns errors to its caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use introflow_core::{SubmissionValidator, ValidatorConfig};
//! use introflow_model::{Ticket, UserIdentity};
//!
//! let validator = SubmissionValidator::from_registry(registry, ValidatorConfig::default());
//! let outcome = validator.validate(&Ticket::new("T-1"), &UserIdentity::anonymous()).await;
//! for missing in &outcome.missing_fields {
//!     println!("{} is required", missing.field_label);
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod resolver;
pub mod submission;
pub mod validator;

// Re-exports
pub use config::{EngineConfig, ValidatorConfig, DEFAULT_LEGACY_PREFIXES};
pub use error::{ConfigError, ConfigurationError, ResolutionError, SubmissionError, ValidationFault};
pub use resolver::{
    AssignedUserTemplate, RegistryDefault, Resolution, ResolutionSource, ResolutionStep,
    ResolvedTemplate, StepOutcome, StoredTemplate, TemplateResolver, TemplateStrategy,
};
pub use submission::{SubmissionGate, SubmissionReceipt};
pub use validator::{MissingField, SubmissionValidator, ValidationOutcome};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for embedding the engine
    pub use crate::{
        EngineConfig, MissingField, ResolutionSource, SubmissionGate, SubmissionValidator,
        TemplateResolver, ValidationOutcome, ValidatorConfig,
    };
}
