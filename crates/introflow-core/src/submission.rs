//! Submission gate
//!
//! Moves a draft ticket to `submitted` once validation passes, pinning the
//! governing template so later edits to user assignments or the registry
//! default no longer change which requirements apply.

use crate::error::SubmissionError;
use crate::validator::{SubmissionValidator, ValidationOutcome};
use chrono::{DateTime, Utc};
use introflow_model::{
    validate_transition, TemplateId, Ticket, TicketId, TicketStatus, UserIdentity,
};
use serde::Serialize;

/// Record of an accepted submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// Submitted ticket
    pub ticket_id: TicketId,
    /// Template the ticket is now pinned to, if any resolved
    pub template_id: Option<TemplateId>,
    /// Whether this submission set the pin
    pub pinned: bool,
    /// Acceptance time
    pub submitted_at: DateTime<Utc>,
    /// Validation that admitted the ticket
    pub outcome: ValidationOutcome,
}

/// Validates and submits draft tickets
#[derive(Debug)]
pub struct SubmissionGate {
    validator: SubmissionValidator,
}

impl SubmissionGate {
    /// Create gate around a validator
    #[must_use]
    pub fn new(validator: SubmissionValidator) -> Self {
        Self { validator }
    }

    /// Underlying validator
    #[inline]
    #[must_use]
    pub fn validator(&self) -> &SubmissionValidator {
        &self.validator
    }

    /// Submit `ticket` on behalf of `identity`
    ///
    /// # Errors
    /// - [`SubmissionError::Transition`] if the ticket is not a draft
    /// - [`SubmissionError::Incomplete`] if required fields are empty
    ///
    /// The ticket is left untouched on error.
    pub async fn submit(
        &self,
        ticket: &mut Ticket,
        identity: &UserIdentity,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        validate_transition(ticket.status, TicketStatus::Submitted)?;

        let outcome = self.validator.validate(ticket, identity).await;
        if !outcome.is_valid {
            tracing::info!(
                ticket = %ticket.id,
                "Submission rejected: {} required field(s) missing",
                outcome.missing_fields.len()
            );
            return Err(SubmissionError::Incomplete {
                missing: outcome.missing_fields,
            });
        }

        let template_id = outcome.template.as_ref().map(|t| t.id.clone());
        let pinned = template_id
            .as_ref()
            .is_some_and(|id| ticket.pin_template(id));
        ticket.transition(TicketStatus::Submitted)?;

        tracing::info!(
            ticket = %ticket.id,
            "Ticket submitted (template: {})",
            template_id.as_ref().map_or("none", TemplateId::as_str)
        );

        Ok(SubmissionReceipt {
            ticket_id: ticket.id.clone(),
            template_id,
            pinned,
            submitted_at: Utc::now(),
            outcome,
        })
    }
}
