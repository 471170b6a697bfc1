//! A tagged-variant value type for the dynamically-typed surfaces this core
//! has to consume: node properties, user attributes, and ID-token claims.
//!
//! IdP and user-store responses are arbitrary JSON; rather than letting each
//! executor re-derive its own shape assumptions from `serde_json::Value`,
//! every call site goes through [`AttrValue`] and the conversions here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One attribute/claim/property value, as it arrives from an external
/// collaborator (user store, IdP, flow-author config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<AttrValue>),
    Object(HashMap<String, AttrValue>),
}

impl AttrValue {
    /// Borrow as a string if this value is a `String` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Render any variant as its default string form.
    ///
    /// Strings pass through unchanged; everything else is rendered via its
    /// JSON representation. This is the "default formatting" the
    /// attribute-collector applies to non-string user attributes.
    pub fn to_display_string(&self) -> String {
        match self {
            AttrValue::Null => String::new(),
            AttrValue::Bool(b) => b.to_string(),
            AttrValue::Number(n) => n.to_string(),
            AttrValue::String(s) => s.clone(),
            AttrValue::Array(_) | AttrValue::Object(_) => {
                serde_json::to_string(self).unwrap_or_default()
            }
        }
    }

    /// Interpret this value as a sequence of strings.
    ///
    /// Accepts an `Array` of strings directly, or a single `String` treated
    /// as a one-element sequence (the shape some IdPs send a lone group in).
    pub fn as_str_seq(&self) -> Option<Vec<String>> {
        match self {
            AttrValue::Array(items) => Some(
                items
                    .iter()
                    .map(AttrValue::to_display_string)
                    .collect(),
            ),
            AttrValue::String(s) => Some(vec![s.clone()]),
            _ => None,
        }
    }

    /// True for an empty string, empty array, null, or empty object.
    pub fn is_empty_ish(&self) -> bool {
        match self {
            AttrValue::Null => true,
            AttrValue::String(s) => s.is_empty(),
            AttrValue::Array(a) => a.is_empty(),
            AttrValue::Object(o) => o.is_empty(),
            AttrValue::Bool(_) | AttrValue::Number(_) => false,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

/// Convenience alias for the attribute maps passed around the flow
/// (`AuthenticatedUser::attributes`, ID-token claims, user-store records).
pub type AttrMap = HashMap<String, AttrValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_round_trips() {
        let v = AttrValue::from("alice");
        assert_eq!(v.as_str(), Some("alice"));
        assert_eq!(v.to_display_string(), "alice");
    }

    #[test]
    fn number_renders_as_string() {
        let v = AttrValue::Number(serde_json::Number::from(42));
        assert_eq!(v.to_display_string(), "42");
        assert!(v.as_str().is_none());
    }

    #[test]
    fn array_of_strings_as_seq() {
        let v = AttrValue::Array(vec![AttrValue::from("a"), AttrValue::from("b")]);
        assert_eq!(v.as_str_seq(), Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn lone_string_is_one_element_seq() {
        let v = AttrValue::from("solo-group");
        assert_eq!(v.as_str_seq(), Some(vec!["solo-group".to_string()]));
    }

    #[test]
    fn emptiness_checks() {
        assert!(AttrValue::Null.is_empty_ish());
        assert!(AttrValue::from("").is_empty_ish());
        assert!(!AttrValue::from("x").is_empty_ish());
        assert!(AttrValue::Array(vec![]).is_empty_ish());
    }
}
