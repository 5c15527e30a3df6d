//! Error types for the data model

use crate::ticket::TicketStatus;

/// Errors raised while building or mutating model values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Field key failed to parse
    #[error("invalid field key '{key}': {reason}")]
    InvalidFieldKey {
        /// The rejected input
        key: String,
        /// Why it was rejected
        reason: String,
    },

    /// Same field key declared twice in one form configuration
    #[error("duplicate field key '{key}' in form configuration '{form}'")]
    DuplicateFieldKey {
        /// Offending key
        key: String,
        /// Form configuration name
        form: String,
    },

    /// Ticket status change not permitted by the approval pipeline
    #[error("illegal ticket transition: {from} -> {to}")]
    IllegalTransition {
        /// Current status
        from: TicketStatus,
        /// Requested status
        to: TicketStatus,
    },
}

impl ModelError {
    /// Create invalid field key error
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFieldKey {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_key_display() {
        let err = ModelError::invalid_key("a..b", "empty segment");
        assert_eq!(err.to_string(), "invalid field key 'a..b': empty segment");
    }

    #[test]
    fn illegal_transition_display() {
        let err = ModelError::IllegalTransition {
            from: TicketStatus::Approved,
            to: TicketStatus::Draft,
        };
        assert_eq!(err.to_string(), "illegal ticket transition: approved -> draft");
    }
}
