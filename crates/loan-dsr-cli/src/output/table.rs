use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten_fields, nested_tables, result_of};

/// Format output as tables: the summary fields, then one table per nested
/// list (e.g. the per-loan breakdown), then warnings and methodology.
pub fn print_table(value: &Value) {
    let result = result_of(value);

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flatten_fields(result) {
        builder.push_record([key, val]);
    }
    println!("{}", Table::from(builder));

    for (name, rows) in nested_tables(result) {
        println!("\n{}:", name);
        print_rows(rows);
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_rows(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }

    let flattened: Vec<Vec<(String, String)>> = rows.iter().map(flatten_fields).collect();
    // Rows may differ in optional fields; use the union of keys in first-seen order.
    let mut headers: Vec<String> = Vec::new();
    for (key, _) in flattened.iter().flatten() {
        if !headers.contains(key) {
            headers.push(key.clone());
        }
    }

    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in &flattened {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| {
                row.iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default()
            })
            .collect();
        builder.push_record(cells);
    }
    println!("{}", Table::from(builder));
}
