//! Error types for introflow Core
//!
//! None of these reach the caller of
//! [`SubmissionValidator::validate`](crate::SubmissionValidator::validate):
//! - [`ResolutionError`] / [`ConfigurationError`] mean "not found at this step"
//! - [`ValidationFault`] collapses to the fail-open outcome
//!
//! [`SubmissionError`] is the only error surfaced to callers, by the
//! submission gate.

use crate::resolver::ResolutionSource;
use crate::validator::MissingField;
use introflow_model::{FormConfigurationId, ModelError, TemplateId};
use introflow_registry::StoreError;
use std::path::PathBuf;

/// Failure while trying one resolution step
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolutionError {
    /// Store lookup failed
    #[error("{step} lookup failed: {error}")]
    Lookup {
        /// Step that failed
        step: ResolutionSource,
        /// Underlying store error
        #[source]
        error: StoreError,
    },

    /// Template found but unusable
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl ResolutionError {
    /// Create lookup error for step
    pub fn lookup(step: ResolutionSource, error: StoreError) -> Self {
        Self::Lookup { step, error }
    }
}

/// Template registry misconfiguration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// Template points at a form configuration that does not exist
    #[error("template '{template}' references missing form configuration '{form}'")]
    MissingForm {
        /// Template ID
        template: TemplateId,
        /// Dangling reference
        form: FormConfigurationId,
    },
}

/// Internal fault during validation
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationFault {
    /// Ticket data is not an object tree
    #[error("ticket data must be an object, found {found}")]
    MalformedTicketData {
        /// JSON type encountered
        found: &'static str,
    },
}

/// Submission refused by the gate
#[derive(Debug, Clone, thiserror::Error)]
pub enum SubmissionError {
    /// Ticket is not in a status that may be submitted
    #[error("cannot submit: {0}")]
    Transition(#[from] ModelError),

    /// Required fields are empty
    #[error("{} required field(s) missing", .missing.len())]
    Incomplete {
        /// Missing fields with labels
        missing: Vec<MissingField>,
    },
}

impl SubmissionError {
    /// Missing fields, if this is an incomplete submission
    #[must_use]
    pub fn missing_fields(&self) -> &[MissingField] {
        match self {
            Self::Incomplete { missing } => missing,
            Self::Transition(_) => &[],
        }
    }
}

/// Errors loading engine configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file unreadable
    #[error("io error reading {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file not valid TOML for this schema
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
