//! Tolerant readers for values written by the coop firmware.
//!
//! The firmware and older dashboards have stored the same field as a JSON
//! bool, a number or a string depending on the code path that wrote it.
//! Every reader here maps anything it does not recognise to `None`, so a
//! malformed field shows up as absent instead of failing the whole record.

use serde_json::Value;

/// Reads a boolean-like value.
///
/// Accepted: `true`, `false`, `"true"`, `"false"`, `1`, `0`, `"1"`, `"0"`.
pub fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => match number.as_f64() {
            Some(n) if n == 1.0 => Some(true),
            Some(n) if n == 0.0 => Some(false),
            _ => None,
        },
        Value::String(text) => match text.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Reads a finite number from a JSON number or a numeric string.
pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    number.is_finite().then_some(number)
}

/// Reads an epoch-seconds timestamp, truncating any fractional part.
pub fn parse_timestamp(value: &Value) -> Option<i64> {
    let number = parse_number(value)?;

    if number < i64::MIN as f64 || number > i64::MAX as f64 {
        return None;
    }

    Some(number.trunc() as i64)
}

/// Reads `record[key]` as a flag.
pub fn flag_field(record: &Value, key: &str) -> Option<bool> {
    record.get(key).and_then(parse_flag)
}

/// Reads `record[key]` as a number.
pub fn number_field(record: &Value, key: &str) -> Option<f64> {
    record.get(key).and_then(parse_number)
}

/// Reads `record[key]` as a timestamp.
pub fn timestamp_field(record: &Value, key: &str) -> Option<i64> {
    record.get(key).and_then(parse_timestamp)
}

/// Reads `record[key]` as a non-empty string.
pub fn text_field<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}
