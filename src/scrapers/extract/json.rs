//! JSON path and URL template utilities for API payloads.

use serde_json::Value;

/// Resolve a path to a full URL, handling both absolute and relative paths.
pub fn resolve_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Extract a value from nested JSON using dot-notation path.
pub fn extract_path<'a>(data: &'a Value, path: &str) -> &'a Value {
    if path.is_empty() {
        return data;
    }

    let mut current = data;
    for key in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(key).unwrap_or(&Value::Null),
            Value::Array(arr) => {
                if let Ok(idx) = key.parse::<usize>() {
                    arr.get(idx).unwrap_or(&Value::Null)
                } else {
                    &Value::Null
                }
            }
            _ => &Value::Null,
        };
    }

    current
}

/// Scalar JSON value as trimmed, non-empty text.
pub fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Fill `{key}` placeholders from an object's scalar fields.
///
/// Returns None if any placeholder is left unresolved.
pub fn render_template(template: &str, item: &Value) -> Option<String> {
    let obj = item.as_object()?;
    let mut rendered = template.to_string();
    for (key, value) in obj {
        if let Some(text) = value_text(value) {
            rendered = rendered.replace(&format!("{{{}}}", key), &text);
        }
    }
    (!rendered.contains('{')).then_some(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_path_nested() {
        let data = json!({"data": {"records": [{"id": 7}]}});
        assert_eq!(extract_path(&data, "data.records.0.id"), &json!(7));
        assert_eq!(extract_path(&data, "data.missing"), &Value::Null);
        assert_eq!(extract_path(&data, ""), &data);
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!(" 2017 ")).as_deref(), Some("2017"));
        assert_eq!(value_text(&json!(45000)).as_deref(), Some("45000"));
        assert_eq!(value_text(&json!("")), None);
        assert_eq!(value_text(&json!(null)), None);
        assert_eq!(value_text(&json!([1])), None);
    }

    #[test]
    fn test_render_template() {
        let item = json!({"slug": "bajaj-avenger-220", "id": 12});
        assert_eq!(
            render_template("https://droom.in/product/{slug}", &item).as_deref(),
            Some("https://droom.in/product/bajaj-avenger-220")
        );
        assert_eq!(render_template("https://x/{missing}", &item), None);
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(resolve_url("https://droom.in/", "/product/x"), "https://droom.in/product/x");
        assert_eq!(resolve_url("https://droom.in", "https://cdn/x"), "https://cdn/x");
    }
}
