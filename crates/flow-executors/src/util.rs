//! Shared helpers used across executors: value conversions, the client/
//! server error fold, dot-path JSON traversal, and placeholder substitution.
//!
//! Centralizing these keeps each executor's `execute` reading as the
//! algorithm from the spec rather than re-deriving conversions at every call
//! site (§9 "Dynamic typing in claim/attribute maps").

use std::collections::HashMap;

use flow_collab::ServiceError;
use flow_engine::{AttrMap, AttrValue};

/// Fold a collaborator's `Result` into either its success value or an early
/// return from the calling `execute`.
///
/// `ClientError` becomes `Ok(ExecutorResponse::failure(description))`;
/// `ServerError` propagates as an `ExecutorError`. This is the one error fold
/// §6/§7 describe every collaborator call site using.
#[macro_export]
macro_rules! try_service {
    ($result:expr) => {
        match $result {
            Ok(v) => v,
            Err(e) if flow_collab::ServiceError::is_client(&e) => {
                return Ok(flow_engine::ExecutorResponse::failure(
                    flow_collab::ServiceError::description(&e).to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
        }
    };
    ($result:expr, |$desc:ident| $msg:expr) => {
        match $result {
            Ok(v) => v,
            Err(e) if flow_collab::ServiceError::is_client(&e) => {
                let $desc = flow_collab::ServiceError::description(&e).to_string();
                return Ok(flow_engine::ExecutorResponse::failure($msg));
            }
            Err(e) => return Err(e.into()),
        }
    };
}

/// Convert a JSON value into an [`AttrValue`]. JSON and `AttrValue` share the
/// same untagged shape, so this is a pure reinterpretation.
pub fn value_to_attr(value: serde_json::Value) -> AttrValue {
    serde_json::from_value(value).unwrap_or(AttrValue::Null)
}

/// Convert an [`AttrValue`] back into a JSON value.
pub fn attr_to_value(attr: &AttrValue) -> serde_json::Value {
    serde_json::to_value(attr).unwrap_or(serde_json::Value::Null)
}

/// Convert a JSON object into an [`AttrMap`], dropping non-object input to
/// an empty map (callers only ever pass object-shaped claims/attributes).
pub fn json_object_to_attrmap(value: serde_json::Value) -> AttrMap {
    match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| (k, value_to_attr(v)))
            .collect(),
        _ => AttrMap::new(),
    }
}

/// Convert an [`AttrMap`] into a flat string map, rendering non-string
/// values with [`AttrValue::to_display_string`]. Used wherever an attribute
/// set must be narrowed to the `HashMap<String, String>` shape a
/// collaborator call (e.g. `CredentialsAuthService::authenticate`) expects.
pub fn attrmap_to_string_map(attrs: &AttrMap) -> HashMap<String, String> {
    attrs
        .iter()
        .map(|(k, v)| (k.clone(), v.to_display_string()))
        .collect()
}

/// Convert a flat string map into an [`AttrMap`] of string-valued attributes.
pub fn string_map_to_attrmap(map: &HashMap<String, String>) -> AttrMap {
    map.iter()
        .map(|(k, v)| (k.clone(), AttrValue::from(v.as_str())))
        .collect()
}

/// Drop every key in `deny` from `attrs`, returning a filtered copy.
pub fn filter_out(attrs: &AttrMap, deny: &[&str]) -> AttrMap {
    attrs
        .iter()
        .filter(|(k, _)| !deny.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Read a `NodeProperties` entry that may be declared either as a nested
/// JSON object/array or as a JSON-encoded string of the same shape — the
/// "dual config shape" several executors (HTTP-Request, OAuth provider
/// props) accept (§9). Returns the normalized value either way.
pub fn normalize_property(
    properties: &HashMap<String, AttrValue>,
    key: &str,
) -> Option<serde_json::Value> {
    let raw = properties.get(key)?;
    match raw {
        AttrValue::String(s) => serde_json::from_str(s).ok().or_else(|| {
            // Not JSON — treat the bare string as a scalar value.
            Some(serde_json::Value::String(s.clone()))
        }),
        other => Some(attr_to_value(other)),
    }
}

/// Traverse a JSON value by a dot-separated path (`response.data.email`),
/// returning the addressed value if every segment resolves. Array indices
/// are not supported — the response-mapping surface only ever addresses
/// object keys.
pub fn dot_path<'a>(root: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Render a JSON value as the string `RuntimeData` entries expect: strings
/// pass through unquoted, everything else renders as its JSON form.
pub fn json_to_runtime_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Recursively substitute `{{placeholder}}` tokens in a JSON value with
/// values looked up from `vars`. Placeholders that don't resolve are left
/// untouched. Walks into nested objects and arrays (§4.8 "recursively,
/// including nested objects and arrays").
pub fn substitute_placeholders(value: &serde_json::Value, vars: &HashMap<String, String>) -> serde_json::Value {
    match value {
        serde_json::Value::String(s) => serde_json::Value::String(substitute_in_str(s, vars)),
        serde_json::Value::Array(items) => serde_json::Value::Array(
            items.iter().map(|v| substitute_placeholders(v, vars)).collect(),
        ),
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute_placeholders(v, vars)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// `{{key}}` substitution within a single string. Non-matching tokens are
/// left verbatim so a malformed placeholder fails loudly downstream rather
/// than silently vanishing.
pub fn substitute_in_str(input: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    loop {
        match rest.find("{{") {
            None => {
                out.push_str(rest);
                break;
            }
            Some(start) => {
                out.push_str(&rest[..start]);
                let after = &rest[start + 2..];
                match after.find("}}") {
                    None => {
                        out.push_str(&rest[start..]);
                        break;
                    }
                    Some(end) => {
                        let key = after[..end].trim();
                        match vars.get(key) {
                            Some(value) => out.push_str(value),
                            None => {
                                out.push_str("{{");
                                out.push_str(key);
                                out.push_str("}}");
                            }
                        }
                        rest = &after[end + 2..];
                    }
                }
            }
        }
    }
    out
}
