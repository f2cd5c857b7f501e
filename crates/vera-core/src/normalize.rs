// DETERMINISTIC NORMALIZATION
// Canonical form for candidate values, used by strict agreement and the
// ledger digest. Same value in any surface formatting produces the same
// canonical form on every platform.
//
// Rules:
// 1. Surrounding whitespace is trimmed
// 2. Boolean-like tokens ("true"/"false" in any casing) become booleans
// 3. Numeric formatting is canonicalized ("42.0" and "42" agree)
// 4. Object keys are ordered lexicographically

use serde_json::{Map, Number, Value};

/// Rebuild a value in canonical form.
pub fn canonical_value(value: &Value) -> Value {
    match value {
        Value::String(raw) => canonical_text(raw),
        Value::Number(n) => Value::Number(canonical_number(n)),
        Value::Array(items) => Value::Array(items.iter().map(canonical_value).collect()),
        Value::Object(fields) => {
            let mut ordered = Map::new();
            for (key, field) in fields {
                ordered.insert(key.clone(), canonical_value(field));
            }
            Value::Object(ordered)
        }
        other => other.clone(),
    }
}

/// Render the canonical form as text. Two values agree under strict
/// evaluation iff their canonical forms are byte-identical.
pub fn canonical_form(value: &Value) -> String {
    canonical_value(value).to_string()
}

fn canonical_text(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Some(number) = parse_number(trimmed) {
        return Value::Number(number);
    }
    Value::String(trimmed.to_string())
}

fn parse_number(text: &str) -> Option<Number> {
    if text.is_empty() {
        return None;
    }
    if let Ok(integer) = text.parse::<i64>() {
        return Some(Number::from(integer));
    }
    match text.parse::<f64>() {
        Ok(float) if float.is_finite() => Some(canonical_float(float)),
        _ => None,
    }
}

fn canonical_number(n: &Number) -> Number {
    if n.is_i64() || n.is_u64() {
        return n.clone();
    }
    match n.as_f64() {
        Some(float) if float.is_finite() => canonical_float(float),
        _ => n.clone(),
    }
}

// Integral floats collapse to integers so "42.0" and "42" share one form.
fn canonical_float(float: f64) -> Number {
    const EXACT_INT_BOUND: f64 = 9_007_199_254_740_992.0; // 2^53
    if float.fract() == 0.0 && float.abs() < EXACT_INT_BOUND {
        return Number::from(float as i64);
    }
    // Finite by the caller's check, so from_f64 always yields a number
    Number::from_f64(float).unwrap_or_else(|| Number::from(0))
}
