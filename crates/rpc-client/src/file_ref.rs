//! Normalization of file references returned by the backend.
//!
//! File outputs arrive either as a bare string or as an object carrying a
//! `url` or `path`.  Callers only ever see one absolute URL.

use serde_json::Value;

/// Resolve a raw file-reference value to an absolute URL.
///
/// Objects prefer `url` over `path`.  Anything else (null, numbers, an
/// object with neither field, an empty string) yields `None`.
pub fn normalize_file_ref(base_url: &str, value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map
            .get("url")
            .and_then(Value::as_str)
            .or_else(|| map.get("path").and_then(Value::as_str))?,
        _ => return None,
    };

    if raw.is_empty() {
        return None;
    }
    Some(absolutize(base_url, raw))
}

/// Prefix `raw` with `base_url` unless it already carries a scheme, joining
/// the two with exactly one slash.
pub fn absolutize(base_url: &str, raw: &str) -> String {
    if has_scheme(raw) {
        return raw.to_owned();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        raw.trim_start_matches('/')
    )
}

fn has_scheme(s: &str) -> bool {
    if s.starts_with("data:") || s.starts_with("blob:") {
        return true;
    }
    match s.find("://") {
        Some(0) | None => false,
        Some(pos) => s[..pos]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "http://localhost:7860";

    #[test]
    fn object_path_is_prefixed() {
        let url = normalize_file_ref(BASE, &json!({"path": "/file/model.glb"}));
        assert_eq!(url.as_deref(), Some("http://localhost:7860/file/model.glb"));
    }

    #[test]
    fn object_url_wins_over_path() {
        let v = json!({"url": "https://cdn.example.com/m.stl", "path": "/tmp/m.stl"});
        assert_eq!(
            normalize_file_ref(BASE, &v).as_deref(),
            Some("https://cdn.example.com/m.stl")
        );
    }

    #[test]
    fn null_url_falls_back_to_path() {
        let v = json!({"url": null, "path": "file=/tmp/m.stl"});
        assert_eq!(
            normalize_file_ref(BASE, &v).as_deref(),
            Some("http://localhost:7860/file=/tmp/m.stl")
        );
    }

    #[test]
    fn exactly_one_slash_is_inserted() {
        assert_eq!(absolutize("http://h/", "/a.glb"), "http://h/a.glb");
        assert_eq!(absolutize("http://h", "a.glb"), "http://h/a.glb");
        assert_eq!(absolutize("http://h/", "a.glb"), "http://h/a.glb");
        assert_eq!(absolutize("http://h", "/a.glb"), "http://h/a.glb");
    }

    #[test]
    fn absent_forms_yield_none() {
        assert!(normalize_file_ref(BASE, &Value::Null).is_none());
        assert!(normalize_file_ref(BASE, &json!(42)).is_none());
        assert!(normalize_file_ref(BASE, &json!({"size": 10})).is_none());
        assert!(normalize_file_ref(BASE, &json!("")).is_none());
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            json!("/file/model.glb"),
            json!("file/model.glb"),
            json!("https://cdn.example.com/model.glb"),
            json!({"url": "/file/a.stl"}),
            json!({"path": "/file/b.stl"}),
        ];
        for input in inputs {
            let once = normalize_file_ref(BASE, &input).unwrap();
            let twice = normalize_file_ref(BASE, &Value::String(once.clone())).unwrap();
            assert_eq!(once, twice);
            let after_scheme = once.split_once("://").unwrap().1;
            assert!(!after_scheme.contains("//"), "double slash in {once}");
        }
    }
}
