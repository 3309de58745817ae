use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
        OutputFormat::Text => {
            let mut out = String::new();
            render_text(&serde_json::to_value(value)?, 0, &mut out);
            Ok(out.trim_end().to_string())
        }
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Indented `key: value` outline; nulls and empty collections are skipped.
fn render_text(value: &Value, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                if is_empty(value) {
                    continue;
                }
                if let Some(scalar) = scalar(value) {
                    out.push_str(&format!("{indent}{key}: {scalar}\n"));
                } else {
                    out.push_str(&format!("{indent}{key}:\n"));
                    render_text(value, depth + 1, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                if let Some(scalar) = scalar(item) {
                    out.push_str(&format!("{indent}- {scalar}\n"));
                } else {
                    out.push_str(&format!("{indent}-\n"));
                    render_text(item, depth + 1, out);
                }
            }
        }
        other => {
            if let Some(scalar) = scalar(other) {
                out.push_str(&format!("{indent}{scalar}\n"));
            }
        }
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::String(_) | Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn text_outline_nests_and_skips_empty_values() {
        let value = json!({
            "name": "default",
            "entities": [{"name": "Order", "uid": null, "indexes": []}, "x"],
        });
        let text = render(&value, OutputFormat::Text).expect("should render");
        assert_eq!(text, "entities:\n  -\n    name: Order\n  - x\nname: default");
    }

    #[test]
    fn raw_is_compact_json() {
        let text = render(&json!({"hash": 7}), OutputFormat::Raw).expect("should render");
        assert_eq!(text, r#"{"hash":7}"#);
    }
}
