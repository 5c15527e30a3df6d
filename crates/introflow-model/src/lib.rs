//! introflow data model
//!
//! Typed representation of everything the template resolution and submission
//! validation engine reads.
//!
//! # Core Types
//!
//! - [`FieldKey`]: Dot-delimited path addressing a value inside ticket data
//! - [`FormConfiguration`]: Ordered sections of fields with visibility metadata
//! - [`Template`]: Binding of one form configuration to its submission requirements
//! - [`User`] / [`UserIdentity`]: Optional per-user template assignment
//! - [`Ticket`] / [`TicketStatus`]: Ticket data tree and approval pipeline state
//!
//! # Example
//!
//! ```rust
//! use introflow_model::{FieldKey, Ticket, value};
//! use serde_json::json;
//!
//! let ticket = Ticket::new("T-1").with_data(json!({
//!     "chemicalProperties": { "casNumber": "7732-18-5" }
//! }));
//!
//! let key: FieldKey = "chemicalProperties.casNumber".parse().unwrap();
//! assert!(!value::is_empty(ticket.value(&key)));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod form;
pub mod key;
pub mod template;
pub mod ticket;
pub mod user;
pub mod value;

mod id;

// Re-exports
pub use error::ModelError;
pub use form::{Field, FieldType, FormConfiguration, Section, VisibleWhen, VisibilityPredicate};
pub use id::{FormConfigurationId, TemplateId, TicketId, UserId};
pub use key::FieldKey;
pub use template::Template;
pub use ticket::{allowed_transitions, validate_transition, Ticket, TicketStatus};
pub use user::{User, UserIdentity};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the data model
    pub use crate::{
        Field, FieldKey, FieldType, FormConfiguration, FormConfigurationId, ModelError, Section,
        Template, TemplateId, Ticket, TicketId, TicketStatus, User, UserIdentity, VisibleWhen,
    };
}
