//! Serializable registry contents

use introflow_model::{FormConfiguration, Template, User};
use serde::{Deserialize, Serialize};

/// Forms, templates and users as one document
///
/// Used to seed an [`InMemoryRegistry`](crate::InMemoryRegistry) from a
/// fixture file and to export it again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    /// Form configurations
    #[serde(default)]
    pub forms: Vec<FormConfiguration>,
    /// Templates
    #[serde(default)]
    pub templates: Vec<Template>,
    /// Users
    #[serde(default)]
    pub users: Vec<User>,
}
