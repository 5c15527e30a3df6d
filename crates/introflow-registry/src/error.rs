//! Error types for registry stores

/// Errors raised by store reads and admin writes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Backing store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Stored reference could not be interpreted
    #[error("malformed reference '{reference}': {reason}")]
    MalformedReference {
        /// The reference as stored
        reference: String,
        /// Why it was rejected
        reason: String,
    },

    /// Write targeted an entity that does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind
        kind: &'static str,
        /// Requested ID
        id: String,
    },

    /// Write would violate a registry invariant
    #[error("conflict: {0}")]
    Conflict(String),
}

impl StoreError {
    /// Create not found error
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create malformed reference error
    pub fn malformed(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedReference {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Whether retrying the same read might succeed
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
