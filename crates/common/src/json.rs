//! Lenient field extraction for upstream JSON.
//!
//! Exchanges are inconsistent about numbers: Coincheck sends balances as
//! strings and ticker prices as numbers. These helpers accept both.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde_json::Value;

/// Read a decimal from a JSON string or number.
pub fn decimal_value(val: &Value) -> Option<Decimal> {
    match val {
        Value::String(s) => Decimal::from_str(s.trim())
            .ok()
            .or_else(|| Decimal::from_scientific(s.trim()).ok()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64().and_then(Decimal::from_f64)
            }
        }
        _ => None,
    }
}

/// Read `val[field]` as a decimal.
pub fn decimal_field(val: &Value, field: &str) -> Option<Decimal> {
    val.get(field).and_then(decimal_value)
}

/// Read `val[field]` as a string, empty when absent or null.
pub fn string_field(val: &Value, field: &str) -> String {
    val.get(field)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}
