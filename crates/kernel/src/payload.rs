//! Lenient field readers for callable payloads.
//!
//! Clients send loosely typed JSON. A field that is absent, null, empty, zero
//! or of an unexpected kind reads as `None`, so the handler can report it
//! with its own validation message.

use serde_json::Value;

/// A non-empty string.
pub fn text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

/// A non-zero integer. Whole-valued floats such as `1965.0` are accepted.
pub fn integer(value: Option<Value>) -> Option<i64> {
    let Value::Number(n) = value? else {
        return None;
    };

    let i = match n.as_i64() {
        Some(i) => i,
        None => {
            let f = n.as_f64()?;
            if f.fract() != 0.0 || f < i64::MIN as f64 || f >= i64::MAX as f64 {
                return None;
            }
            f as i64
        }
    };
    (i != 0).then_some(i)
}

/// A non-empty string, or a non-zero number rendered as text.
pub fn text_or_number(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_requires_non_empty_string() {
        assert_eq!(text(Some(json!("Dune"))), Some("Dune".to_string()));
        assert_eq!(text(Some(json!(""))), None);
        assert_eq!(text(Some(json!(42))), None);
        assert_eq!(text(Some(Value::Null)), None);
        assert_eq!(text(None), None);
    }

    #[test]
    fn integer_accepts_whole_numbers_only() {
        assert_eq!(integer(Some(json!(1965))), Some(1965));
        assert_eq!(integer(Some(json!(1965.0))), Some(1965));
        assert_eq!(integer(Some(json!(-300))), Some(-300));
        assert_eq!(integer(Some(json!(1965.5))), None);
        assert_eq!(integer(Some(json!("1965"))), None);
        assert_eq!(integer(Some(json!(0))), None);
        assert_eq!(integer(Some(json!(true))), None);
    }

    #[test]
    fn text_or_number_renders_numbers() {
        assert_eq!(text_or_number(Some(json!("0042"))), Some("0042".to_string()));
        assert_eq!(text_or_number(Some(json!(1234))), Some("1234".to_string()));
        assert_eq!(text_or_number(Some(json!(0))), None);
        assert_eq!(text_or_number(Some(json!(""))), None);
        assert_eq!(text_or_number(Some(json!(["1234"]))), None);
    }
}
