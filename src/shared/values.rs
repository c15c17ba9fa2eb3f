use serde_json::Value;

/// One result row: column or alias name to scalar value.
pub type Row = serde_json::Map<String, Value>;

/// String form of a cell, as used for chart categories and labels.
/// Missing and `null` cells have no display form.
pub fn display_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Lenient numeric coercion: anything that is not a finite number, a numeric
/// string or a boolean becomes `0.0`. Empty strings are `0.0`.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Bool(true)) => 1.0,
        Some(Value::String(s)) if s.trim().is_empty() => 0.0,
        other => parse_number(other).unwrap_or(0.0),
    }
}

/// Strict numeric coercion: only finite numbers and non-blank strings that
/// parse as finite numbers succeed.
pub fn parse_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}
