//! Output formatting: plain text (human-readable) and JSON.

use serde_json::Value;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable key-value lines
    #[default]
    Plain,
    /// JSON (pretty-printed)
    Json,
}

/// Format value as plain text: nested key-value lines, one array item per block.
pub fn format_plain(value: &Value) -> String {
    let mut out = String::new();
    write_plain(value, &mut out, 0);
    out.trim_end().to_string()
}

fn write_plain(v: &Value, out: &mut String, indent: usize) {
    let pad = "  ".repeat(indent);
    match v {
        Value::Array(arr) if arr.is_empty() => {
            let _ = writeln!(out, "{}<empty>", pad);
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                if is_nested(item) {
                    let _ = writeln!(out, "{}[{}]", pad, i + 1);
                    write_plain(item, out, indent + 1);
                } else {
                    let _ = writeln!(out, "{}{}", pad, scalar(item));
                }
            }
        }
        Value::Object(map) => {
            for (k, val) in map {
                if is_nested(val) {
                    let _ = writeln!(out, "{}{}:", pad, k);
                    write_plain(val, out, indent + 1);
                } else {
                    let _ = writeln!(out, "{}{}: {}", pad, k, scalar(val));
                }
            }
        }
        _ => {
            let _ = writeln!(out, "{}{}", pad, scalar(v));
        }
    }
}

fn is_nested(v: &Value) -> bool {
    v.is_object() || v.is_array()
}

fn scalar(v: &Value) -> String {
    match v {
        Value::String(s) => s.replace('\n', " "),
        other => other.to_string(),
    }
}

/// Format value as JSON (pretty).
pub fn format_json(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_plain_scalars() {
        assert_eq!(format_plain(&Value::Null), "null");
        assert_eq!(format_plain(&Value::Bool(true)), "true");
        assert_eq!(format_plain(&serde_json::json!(42)), "42");
        assert_eq!(format_plain(&serde_json::json!("radar")), "radar");
    }

    #[test]
    fn format_plain_empty_array() {
        assert!(format_plain(&Value::Array(vec![])).contains("empty"));
    }

    #[test]
    fn format_plain_nested_object() {
        let v = serde_json::json!({"name": "radar", "stats": {"guilds": 10}});
        let out = format_plain(&v);
        assert!(out.contains("name: radar"));
        assert!(out.contains("stats:"));
        assert!(out.contains("  guilds: 10"));
    }

    #[test]
    fn format_plain_array_of_objects() {
        let v = serde_json::json!([{"id": 1}, {"id": 2}]);
        let out = format_plain(&v);
        assert!(out.contains("[1]"));
        assert!(out.contains("[2]"));
        assert!(out.contains("  id: 2"));
    }

    #[test]
    fn format_json_is_pretty() {
        let v = serde_json::json!({"ok": true});
        assert_eq!(format_json(&v).unwrap(), "{\n  \"ok\": true\n}");
    }
}
