//! Loading registry and ticket files

use anyhow::{bail, Context, Result};
use introflow_model::Ticket;
use introflow_registry::{InMemoryRegistry, RegistrySnapshot};
use std::path::Path;

/// Read a registry snapshot, YAML or JSON by extension
pub(crate) fn load_registry(path: &Path) -> Result<InMemoryRegistry> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read registry file {}", path.display()))?;

    let snapshot: RegistrySnapshot = match extension(path).as_deref() {
        Some("yaml" | "yml") => serde_yaml::from_str(&text)
            .with_context(|| format!("invalid YAML registry {}", path.display()))?,
        Some("json") => serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON registry {}", path.display()))?,
        other => bail!(
            "unsupported registry format {:?} for {}; use .yaml, .yml or .json",
            other.unwrap_or(""),
            path.display()
        ),
    };

    InMemoryRegistry::from_snapshot(snapshot)
        .with_context(|| format!("registry {} violates an invariant", path.display()))
}

/// Read a ticket document
pub(crate) fn load_ticket(path: &Path) -> Result<Ticket> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ticket file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid ticket {}", path.display()))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}
