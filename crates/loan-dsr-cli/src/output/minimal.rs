use serde_json::Value;

use super::{format_scalar, result_of};

/// Key answer fields, in priority order.
const PRIORITY_KEYS: [&str; 4] = ["dsr", "annual_repayment", "basis_description", "strategy"];

/// Print just the key answer value from the output, with the risk tier when
/// one is present (e.g. `14.39 safe`).
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    if let Value::Object(map) = result {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                match map.get("status").and_then(Value::as_str) {
                    Some(status) => println!("{} {}", format_scalar(val), status),
                    None => println!("{}", format_scalar(val)),
                }
                return;
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_scalar(val));
            return;
        }
    }

    println!("{}", format_scalar(result));
}
