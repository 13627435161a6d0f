//! Positional-result accessors shared by the capability wrappers.
//!
//! Backends return results as a JSON array in output-component order.  A
//! missing or oddly-typed slot degrades to an empty value instead of
//! failing the call.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::file_ref::normalize_file_ref;
use crate::types::ParamSpec;

/// Slot `i` as display text: strings as-is, null/missing as empty, anything
/// else JSON-encoded.
pub(crate) fn text_at(data: &[Value], i: usize) -> String {
    match data.get(i) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

pub(crate) fn value_at(data: &[Value], i: usize) -> Value {
    data.get(i).cloned().unwrap_or(Value::Null)
}

/// Slot `i` as an array, accepting either a JSON array or a string holding
/// one.
pub(crate) fn list_at(data: &[Value], i: usize) -> Vec<Value> {
    decode_embedded(data.get(i)).unwrap_or_default()
}

pub(crate) fn params_at(data: &[Value], i: usize) -> BTreeMap<String, ParamSpec> {
    decode_embedded(data.get(i)).unwrap_or_default()
}

pub(crate) fn file_at(base_url: &str, data: &[Value], i: usize) -> Option<String> {
    data.get(i).and_then(|v| normalize_file_ref(base_url, v))
}

/// Decode a slot that carries JSON either inline or as an encoded string.
fn decode_embedded<T: DeserializeOwned>(slot: Option<&Value>) -> Option<T> {
    let result = match slot? {
        Value::String(s) => serde_json::from_str(s),
        Value::Null => return None,
        other => serde_json::from_value(other.clone()),
    };
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!(error = %e, "malformed JSON in result slot; using empty default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_slots() {
        let data = vec![json!("code"), Value::Null, json!({"v": 1})];
        assert_eq!(text_at(&data, 0), "code");
        assert_eq!(text_at(&data, 1), "");
        assert_eq!(text_at(&data, 2), "{\"v\":1}");
        assert_eq!(text_at(&data, 9), "");
    }

    #[test]
    fn list_slot_accepts_encoded_and_inline() {
        let data = vec![json!("[{\"line\":3}]"), json!([1, 2])];
        assert_eq!(list_at(&data, 0), vec![json!({"line": 3})]);
        assert_eq!(list_at(&data, 1), vec![json!(1), json!(2)]);
    }

    #[test]
    fn malformed_list_degrades_to_empty() {
        let data = vec![json!("not json"), json!({"a": 1}), Value::Null];
        assert!(list_at(&data, 0).is_empty());
        assert!(list_at(&data, 1).is_empty());
        assert!(list_at(&data, 2).is_empty());
        assert!(list_at(&data, 3).is_empty());
    }

    #[test]
    fn params_slot_decodes_encoded_mapping() {
        let data = vec![json!("{\"width\": [20, 5, 50]}")];
        let params = params_at(&data, 0);
        assert_eq!(params["width"], ParamSpec::Range(20.into(), 5.into(), 50.into()));
        assert!(params_at(&[json!("{broken")], 0).is_empty());
    }
}
