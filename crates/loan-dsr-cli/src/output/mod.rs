pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` object of a computation envelope, or the value itself.
pub fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Flatten nested objects into `parent.child` rows, skipping arrays of
/// objects (rendered separately as their own table).
pub fn flatten_fields(value: &Value) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    if let Value::Object(map) = value {
        for (key, val) in map {
            push_flat(&mut rows, key, val);
        }
    }
    rows
}

fn push_flat(rows: &mut Vec<(String, String)>, key: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (child, val) in map {
                push_flat(rows, &format!("{key}.{child}"), val);
            }
        }
        Value::Array(items) if items.iter().any(Value::is_object) => {}
        _ => rows.push((key.to_string(), format_scalar(value))),
    }
}

/// Arrays of objects inside a result, keyed by field name.
pub fn nested_tables(value: &Value) -> Vec<(&str, &[Value])> {
    match value {
        Value::Object(map) => map
            .iter()
            .filter_map(|(key, val)| match val {
                Value::Array(items) if items.iter().any(Value::is_object) => {
                    Some((key.as_str(), items.as_slice()))
                }
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_scalar).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
