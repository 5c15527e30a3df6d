//! Tickets and the approval pipeline state machine

use crate::error::ModelError;
use crate::id::{TemplateId, TicketId};
use crate::key::FieldKey;
use crate::value;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Product introduction ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Ticket ID
    pub id: TicketId,
    /// Pipeline status
    #[serde(default)]
    pub status: TicketStatus,
    /// Pinned template, set no later than first submission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_ref: Option<TemplateId>,
    /// Business data addressed by field keys
    #[serde(default = "empty_object")]
    pub data: Value,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

impl Ticket {
    /// Create empty draft without a template
    #[must_use]
    pub fn new(id: impl Into<TicketId>) -> Self {
        Self {
            id: id.into(),
            status: TicketStatus::Draft,
            template_ref: None,
            data: empty_object(),
        }
    }

    /// Replace data tree
    #[inline]
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// With stored template reference
    #[inline]
    #[must_use]
    pub fn with_template(mut self, template: impl Into<TemplateId>) -> Self {
        self.template_ref = Some(template.into());
        self
    }

    /// Value stored under a field key
    #[inline]
    #[must_use]
    pub fn value(&self, key: &FieldKey) -> Option<&Value> {
        value::resolve(&self.data, key)
    }

    /// Pin the ticket to a template if it has none yet
    ///
    /// Returns `true` when the reference was set by this call.
    pub fn pin_template(&mut self, template: &TemplateId) -> bool {
        if self.template_ref.is_some() {
            return false;
        }
        self.template_ref = Some(template.clone());
        true
    }

    /// Move to another pipeline status
    pub fn transition(&mut self, to: TicketStatus) -> Result<(), ModelError> {
        validate_transition(self.status, to)?;
        self.status = to;
        Ok(())
    }
}

/// Approval pipeline status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TicketStatus {
    /// Being edited, not yet submitted
    #[default]
    Draft,
    /// Submitted for approval
    Submitted,
    /// Picked up by a reviewer
    UnderReview,
    /// Approved (terminal)
    Approved,
    /// Sent back for rework
    Rejected,
    /// Withdrawn (terminal)
    Cancelled,
}

impl TicketStatus {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::UnderReview => "underReview",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no further transitions exist
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        allowed_transitions(*self).is_empty()
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statuses reachable in one step
#[must_use]
pub fn allowed_transitions(from: TicketStatus) -> &'static [TicketStatus] {
    use TicketStatus::*;
    match from {
        Draft => &[Submitted, Cancelled],
        Submitted => &[UnderReview, Rejected, Cancelled],
        UnderReview => &[Approved, Rejected],
        Rejected => &[Draft],
        Approved | Cancelled => &[],
    }
}

/// Check a single status change
pub fn validate_transition(from: TicketStatus, to: TicketStatus) -> Result<(), ModelError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(ModelError::IllegalTransition { from, to })
    }
}
