//! The tabular record type: `datastream_id,timestamp,value`.

use crate::error::{codes, CoreError, ErrorCategory, Result};

/// Upper bound on a string-typed datapoint value. 256 bytes is a
/// conservative, documented stand-in for a size a deployment can tune.
pub const VALUE_STRING_MAX_SIZE: usize = 256;

/// A bounded, owned UTF-8 string used for the `Str` datapoint value arm.
/// Construction is the single enforcement point for
/// [`VALUE_STRING_MAX_SIZE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedString(String);

impl BoundedString {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.len() >= VALUE_STRING_MAX_SIZE {
            return Err(CoreError::new(
                codes::DATAPOINT_VALUE_BUFFER_OVERFLOW,
                ErrorCategory::Encoding,
                format!(
                    "string value of {} bytes exceeds the {}-byte bound",
                    value.len(),
                    VALUE_STRING_MAX_SIZE
                ),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The tagged union a datapoint's value carries. `i64`/`f64` rather than
/// 32-bit width since nothing on the wire distinguishes bit width.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(BoundedString),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A timestamped value belonging to one datastream.
#[derive(Debug, Clone, PartialEq)]
pub struct Datapoint {
    pub timestamp: super::timestamp::Timestamp,
    pub value: Value,
}

impl Datapoint {
    pub fn new(timestamp: super::timestamp::Timestamp, value: Value) -> Self {
        Self { timestamp, value }
    }
}

/// Encodes one `datastream_id,timestamp,value` record line, no trailing
/// newline (the caller joins lines with `\n`).
pub fn encode_record(datastream_id: &str, point: &Datapoint) -> String {
    let value = match &point.value {
        Value::Int(v) => v.to_string(),
        Value::Float(v) => format_float(*v),
        Value::Str(s) => quote_field(s.as_str()),
    };
    format!("{},{},{}", quote_field(datastream_id), point.timestamp, value)
}

/// Formats a float with at least one fractional digit, trimming extra
/// trailing zeros but never past one digit after the point.
fn format_float(v: f64) -> String {
    let mut s = format!("{v:.6}");
    while s.ends_with('0') && !s.ends_with(".0") {
        s.pop();
    }
    s
}

/// Quotes a field if it contains the delimiter or a quote character,
/// doubling embedded quotes.
fn quote_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        let escaped = field.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        field.to_string()
    }
}

/// Splits one record line into its raw comma-delimited fields, honoring
/// quoted fields with doubled-quote escapes.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else if c == '"' && current.is_empty() {
            in_quotes = true;
        } else if c == ',' {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    fields.push(current);
    fields
}

/// Parses a raw field into the narrowest value type that fits it: integer,
/// then float, then a bounded string.
pub fn parse_value(field: &str) -> Result<Value> {
    if let Ok(i) = field.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    if let Ok(f) = field.parse::<f64>() {
        return Ok(Value::Float(f));
    }
    Ok(Value::Str(BoundedString::new(field)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::timestamp::Timestamp;

    #[test]
    fn encodes_integer_value() {
        let point = Datapoint::new(Timestamp::new(0, 0), Value::Int(23));
        assert_eq!(encode_record("temp", &point), "temp,1970-01-01T00:00:00Z,23");
    }

    #[test]
    fn encodes_float_with_one_fractional_digit() {
        let point = Datapoint::new(Timestamp::new(0, 0), Value::Float(23.0));
        assert_eq!(encode_record("temp", &point), "temp,1970-01-01T00:00:00Z,23.0");
    }

    #[test]
    fn quotes_string_values_containing_delimiter() {
        let point = Datapoint::new(
            Timestamp::new(0, 0),
            Value::Str(BoundedString::new("a,b\"c").unwrap()),
        );
        assert_eq!(
            encode_record("d", &point),
            "d,1970-01-01T00:00:00Z,\"a,b\"\"c\""
        );
    }

    #[test]
    fn oversized_string_value_reports_overflow() {
        let oversized = "x".repeat(VALUE_STRING_MAX_SIZE);
        let err = BoundedString::new(oversized).unwrap_err();
        assert_eq!(err.code(), codes::DATAPOINT_VALUE_BUFFER_OVERFLOW);
    }

    #[test]
    fn split_fields_respects_quoted_delimiter() {
        let fields = split_fields("temp,\"a,b\"\"c\",23");
        assert_eq!(fields, vec!["temp", "a,b\"c", "23"]);
    }

    #[test]
    fn parse_value_prefers_integer_then_float_then_string() {
        assert_eq!(parse_value("23").unwrap(), Value::Int(23));
        assert_eq!(parse_value("23.5").unwrap(), Value::Float(23.5));
        assert!(matches!(parse_value("abc").unwrap(), Value::Str(_)));
    }
}
