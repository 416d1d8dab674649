use serde_json::Value;
use std::io;

use super::{flatten_fields, nested_tables, result_of};

/// Write output as CSV to stdout.
///
/// The result is written as two-column `field,value` rows, followed by a blank
/// line and one row per item for each nested list (e.g. the per-loan breakdown).
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let _ = write_csv(stdout.lock(), result_of(value));
}

fn write_csv<W: io::Write>(out: W, result: &Value) -> io::Result<W> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["field", "value"])?;
    for (key, val) in flatten_fields(result) {
        wtr.write_record([key, val])?;
    }
    let mut out = wtr.into_inner().map_err(|e| e.into_error())?;

    for (_, rows) in nested_tables(result) {
        writeln!(out)?;
        let mut wtr = csv::Writer::from_writer(out);
        write_rows(&mut wtr, rows);
        out = wtr.into_inner().map_err(|e| e.into_error())?;
    }

    Ok(out)
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) {
    let flattened: Vec<Vec<(String, String)>> = rows.iter().map(flatten_fields).collect();
    let mut headers: Vec<String> = Vec::new();
    for (key, _) in flattened.iter().flatten() {
        if !headers.contains(key) {
            headers.push(key.clone());
        }
    }

    let _ = wtr.write_record(&headers);
    for row in &flattened {
        let record: Vec<&str> = headers
            .iter()
            .map(|h| {
                row.iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| v.as_str())
                    .unwrap_or("")
            })
            .collect();
        let _ = wtr.write_record(&record);
    }
}
