//! Field keys for addressing values within ticket data
//!
//! Provides [`FieldKey`], the dot-delimited path that names both a form field
//! and the storage location of its value.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Path separator inside a field key
pub const SEPARATOR: char = '.';

/// Dot-delimited path into a ticket's data tree
///
/// # Examples
/// - `productName` → top-level value
/// - `chemicalProperties.casNumber` → nested value
/// - `packaging.units.0` → first element of an array
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldKey(String);

impl FieldKey {
    /// Iterate path segments
    #[inline]
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Whether the key names a nested location (contains a separator)
    #[inline]
    #[must_use]
    pub fn is_qualified(&self) -> bool {
        self.0.contains(SEPARATOR)
    }

    /// Prepend a prefix path, returning a new key
    ///
    /// `casNumber` prefixed with `chemicalProperties` becomes
    /// `chemicalProperties.casNumber`.
    pub fn with_prefix(&self, prefix: &str) -> Result<Self, ModelError> {
        format!("{prefix}{SEPARATOR}{}", self.0).parse()
    }

    /// Last segment
    #[inline]
    #[must_use]
    pub fn leaf(&self) -> &str {
        self.0.rsplit(SEPARATOR).next().unwrap_or(&self.0)
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for FieldKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ModelError::invalid_key(s, "empty key"));
        }
        if trimmed.split(SEPARATOR).any(str::is_empty) {
            return Err(ModelError::invalid_key(s, "empty segment"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl TryFrom<String> for FieldKey {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldKey> for String {
    fn from(key: FieldKey) -> Self {
        key.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FieldKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_key() {
        let key: FieldKey = "productName".parse().unwrap();
        assert_eq!(key.depth(), 1);
        assert!(!key.is_qualified());
        assert_eq!(key.leaf(), "productName");
    }

    #[test]
    fn parse_nested_key() {
        let key: FieldKey = "chemicalProperties.casNumber".parse().unwrap();
        let segments: Vec<_> = key.segments().collect();
        assert_eq!(segments, vec!["chemicalProperties", "casNumber"]);
        assert!(key.is_qualified());
        assert_eq!(key.leaf(), "casNumber");
    }

    #[test]
    fn reject_empty_and_hollow_segments() {
        assert!("".parse::<FieldKey>().is_err());
        assert!("   ".parse::<FieldKey>().is_err());
        assert!("a..b".parse::<FieldKey>().is_err());
        assert!(".a".parse::<FieldKey>().is_err());
        assert!("a.".parse::<FieldKey>().is_err());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let key: FieldKey = "  pricing.listPrice ".parse().unwrap();
        assert_eq!(key.as_str(), "pricing.listPrice");
    }

    #[test]
    fn with_prefix_qualifies_key() {
        let key: FieldKey = "casNumber".parse().unwrap();
        let prefixed = key.with_prefix("chemicalProperties").unwrap();
        assert_eq!(prefixed.as_str(), "chemicalProperties.casNumber");
        assert!(key.with_prefix("").is_err());
    }

    #[test]
    fn serde_rejects_invalid_key() {
        let ok: FieldKey = serde_json::from_str("\"a.b\"").unwrap();
        assert_eq!(ok.as_str(), "a.b");
        assert!(serde_json::from_str::<FieldKey>("\"a..b\"").is_err());
    }
}
