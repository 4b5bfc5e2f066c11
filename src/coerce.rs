//! Type coercion from raw request data to typed JSON values.
//!
//! Text coercion covers the string-only sources (path segments, query
//! values); JSON coercion covers scalar leaves of an already-decoded body.
//! Structural types (objects, collections, maps) are walked by the object
//! binder, which calls back in here for every leaf.
//!
//! Coercion is a pure function of (raw value, type descriptor) and has no
//! side effects.

use crate::spec::ParamType;
use serde_json::Value;

/// Failed conversion of a raw value to its declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct CoerceError {
    pub expected: String,
    pub received: String,
}

impl CoerceError {
    pub fn new(expected: impl Into<String>, received: impl Into<String>) -> Self {
        CoerceError {
            expected: expected.into(),
            received: received.into(),
        }
    }
}

impl std::fmt::Display for CoerceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "expected {}, got {}", self.expected, self.received)
    }
}

/// JSON type name for mismatch messages, with integral numbers reported as
/// `integer` so messages match what clients actually sent.
#[must_use]
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_bool_token(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Coerce a single text token (a path segment or query value) to a textual
/// scalar type.
pub fn coerce_text(raw: &str, ty: &ParamType) -> Result<Value, CoerceError> {
    match ty {
        ParamType::String => Ok(Value::String(raw.to_string())),
        ParamType::Integer => raw
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| CoerceError::new("integer", format!("`{raw}`"))),
        ParamType::Float => raw
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::from)
            .ok_or_else(|| CoerceError::new("number", format!("`{raw}`"))),
        ParamType::Boolean => parse_bool_token(raw)
            .map(Value::from)
            .ok_or_else(|| CoerceError::new("boolean", format!("`{raw}`"))),
        ParamType::Enum(e) => {
            if e.contains(raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(CoerceError::new(ty.describe(), format!("`{raw}`")))
            }
        }
        other => Err(CoerceError::new(
            other.describe(),
            format!("text value `{raw}`"),
        )),
    }
}

/// Coerce a scalar leaf of a decoded JSON body.
///
/// Body values are already typed by the JSON decoder, so no string-to-number
/// laundering happens here: a JSON string never binds to an integer type,
/// and a fractional number never binds to an integer.
pub fn coerce_scalar_json(raw: &Value, ty: &ParamType) -> Result<Value, CoerceError> {
    let mismatch = || CoerceError::new(ty.describe(), json_type_name(raw));
    match ty {
        ParamType::String => match raw {
            Value::String(s) => Ok(Value::String(s.clone())),
            _ => Err(mismatch()),
        },
        ParamType::Integer => match raw {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(raw.clone()),
            _ => Err(mismatch()),
        },
        ParamType::Float => match raw {
            // An integral JSON number is a valid float; widen it.
            Value::Number(n) => n
                .as_f64()
                .map(Value::from)
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        ParamType::Boolean => match raw {
            Value::Bool(_) => Ok(raw.clone()),
            _ => Err(mismatch()),
        },
        ParamType::Enum(e) => match raw {
            Value::String(s) if e.contains(s) => Ok(raw.clone()),
            Value::String(s) => Err(CoerceError::new(ty.describe(), format!("`{s}`"))),
            _ => Err(mismatch()),
        },
        other => Err(CoerceError::new(other.describe(), json_type_name(raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::EnumSpec;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_numeric_text_round_trips() {
        assert_eq!(coerce_text("42", &ParamType::Integer).unwrap(), json!(42));
        assert_eq!(coerce_text("-7", &ParamType::Integer).unwrap(), json!(-7));
        assert_eq!(coerce_text("1.5", &ParamType::Float).unwrap(), json!(1.5));
        assert!(coerce_text("4.2", &ParamType::Integer).is_err());
        assert!(coerce_text("NaN", &ParamType::Float).is_err());
    }

    #[test]
    fn test_bool_tokens_are_case_insensitive() {
        for raw in ["true", "TRUE", "1"] {
            assert_eq!(coerce_text(raw, &ParamType::Boolean).unwrap(), json!(true));
        }
        for raw in ["false", "False", "0"] {
            assert_eq!(coerce_text(raw, &ParamType::Boolean).unwrap(), json!(false));
        }
        assert!(coerce_text("yes", &ParamType::Boolean).is_err());
    }

    #[test]
    fn test_enum_is_exact_match() {
        let pet = ParamType::Enum(Arc::new(EnumSpec::new("Pet", ["dog", "cat", "horse"])));
        assert_eq!(coerce_text("dog", &pet).unwrap(), json!("dog"));
        let err = coerce_text("bird", &pet).unwrap_err();
        assert!(err.expected.contains("dog"));
        assert!(coerce_text("DOG", &pet).is_err());
    }

    #[test]
    fn test_json_scalars_are_not_laundered() {
        assert!(coerce_scalar_json(&json!("42"), &ParamType::Integer).is_err());
        assert!(coerce_scalar_json(&json!(1.5), &ParamType::Integer).is_err());
        assert_eq!(
            coerce_scalar_json(&json!(3), &ParamType::Float).unwrap(),
            json!(3.0)
        );
        assert!(coerce_scalar_json(&json!("true"), &ParamType::Boolean).is_err());
    }
}
