//! Users and the identity they act under

use crate::id::{TemplateId, UserId};
use serde::{Deserialize, Serialize};

/// User record, optionally assigned a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID
    pub id: UserId,
    /// Employee number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Assigned template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_ref: Option<TemplateId>,
}

impl User {
    /// Create user without identity keys or template
    #[must_use]
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            employee_id: None,
            email: None,
            template_ref: None,
        }
    }

    /// With employee ID
    #[must_use]
    pub fn with_employee_id(mut self, employee_id: impl Into<String>) -> Self {
        self.employee_id = Some(employee_id.into());
        self
    }

    /// With email
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// With assigned template
    #[must_use]
    pub fn with_template(mut self, template: impl Into<TemplateId>) -> Self {
        self.template_ref = Some(template.into());
        self
    }
}

/// Identity of the user acting on a ticket
///
/// The two keys are equivalent: a user matches when either one matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Employee number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserIdentity {
    /// Identity with no keys (matches nobody)
    #[inline]
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Identity by employee number
    #[must_use]
    pub fn employee(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: Some(employee_id.into()),
            email: None,
        }
    }

    /// Identity by email
    #[must_use]
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            employee_id: None,
            email: Some(email.into()),
        }
    }

    /// Whether no identity key is present
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        non_blank(self.employee_id.as_deref()).is_none()
            && non_blank(self.email.as_deref()).is_none()
    }

    /// OR-match against a user record
    ///
    /// Employee IDs compare exactly, emails ignore ASCII case. Blank keys
    /// never match.
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        let by_employee = match (
            non_blank(self.employee_id.as_deref()),
            non_blank(user.employee_id.as_deref()),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        let by_email = match (non_blank(self.email.as_deref()), non_blank(user.email.as_deref())) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        };
        by_employee || by_email
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("u1")
            .with_employee_id("E100")
            .with_email("Ana.Lopez@example.com")
    }

    #[test]
    fn matches_by_either_key() {
        assert!(UserIdentity::employee("E100").matches(&user()));
        assert!(UserIdentity::email("ana.lopez@example.com").matches(&user()));
        assert!(!UserIdentity::employee("E200").matches(&user()));
    }

    #[test]
    fn one_matching_key_is_enough() {
        let identity = UserIdentity {
            employee_id: Some("E999".to_string()),
            email: Some("ana.lopez@example.com".to_string()),
        };
        assert!(identity.matches(&user()));
    }

    #[test]
    fn blank_keys_never_match() {
        let anonymous = UserIdentity {
            employee_id: Some("  ".to_string()),
            email: None,
        };
        assert!(anonymous.is_anonymous());
        assert!(!anonymous.matches(&User::new("u2").with_employee_id("  ")));
    }
}
