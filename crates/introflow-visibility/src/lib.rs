//! introflow Visibility
//!
//! The one visibility predicate shared by the submission validator and the
//! interactive form renderer.
//!
//! # Overview
//!
//! - [`is_visible`]: Pure predicate over a field, a [`ValueLookup`] and a [`VisibilityMode`]
//! - [`ValueLookup`]: Source of current field values (ticket data, edits, authored defaults)
//! - [`render`] / [`preview`] / [`catalog`]: Visibility-annotated render plans
//!
//! # Example
//!
//! ```rust
//! use introflow_model::{Field, FieldKey, FieldType, VisibleWhen};
//! use introflow_visibility::{is_visible, VisibilityMode};
//! use serde_json::json;
//!
//! let hazard: FieldKey = "isHazardous".parse().unwrap();
//! let field = Field::new("unNumber".parse().unwrap(), "UN Number", FieldType::Text)
//!     .with_visible_when(VisibleWhen::equals(hazard, "true"));
//!
//! let data = json!({ "isHazardous": true });
//! assert!(is_visible(&field, &data, VisibilityMode::Edit));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod evaluator;
pub mod lookup;
pub mod render;

// Re-exports
pub use evaluator::{is_visible, matches_condition, VisibilityMode};
pub use lookup::{DefaultValues, FnLookup, ValueLookup, ValueOverlay};
pub use render::{catalog, preview, render, RenderPlan, RenderedField, RenderedSection};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
