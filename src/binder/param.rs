//! Binding of single parameters from the text sources (path and query).
//!
//! The order of operations per parameter is fixed: presence (default or
//! required check), then coercion, then constraint evaluation. Constraints
//! never run on a value that failed to coerce, and declared defaults skip
//! both steps because they were proven valid at registration.

use crate::coerce;
use crate::constraints;
use crate::error::{index, BindingErrorKind, FieldError};
use crate::spec::{ParamType, ParameterSpec};
use serde_json::Value;

use super::constraint_failure;

fn location_of(spec: &ParameterSpec) -> String {
    format!("{}.{}", spec.source, spec.name)
}

fn missing(spec: &ParameterSpec) -> FieldError {
    FieldError::new(
        location_of(spec),
        BindingErrorKind::MissingRequired,
        format!(
            "required {} parameter `{}` is missing",
            spec.source,
            spec.lookup_key()
        ),
    )
}

/// Bind one path parameter from its extracted segment text.
///
/// Registration guarantees path parameters are required and have no default,
/// so an absent capture is always an error.
pub(crate) fn bind_path_param(
    spec: &ParameterSpec,
    raw: Option<&str>,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let raw = match raw {
        Some(raw) => raw,
        None => {
            errors.push(missing(spec));
            return None;
        }
    };
    bind_text(spec, &location_of(spec), raw, errors)
}

/// Bind one query parameter from every occurrence of its key, in encounter
/// order.
///
/// Collection-typed parameters consume all repetitions (`q=1&q=2` binds to
/// `["1","2"]`); scalar parameters use the last occurrence. An absent key
/// falls back to the declared default verbatim, or trips the required check.
pub(crate) fn bind_query_param(
    spec: &ParameterSpec,
    values: &[&str],
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let location = location_of(spec);
    if values.is_empty() {
        if let Some(default) = &spec.default {
            return Some(default.clone());
        }
        if spec.required {
            errors.push(missing(spec));
        }
        return None;
    }

    match &spec.ty {
        ParamType::List(elem) | ParamType::Set(elem) => {
            let dedup = matches!(spec.ty, ParamType::Set(_));
            let before = errors.len();
            let mut bound = Vec::with_capacity(values.len());
            for (i, raw) in values.iter().enumerate() {
                match coerce::coerce_text(raw, elem) {
                    Ok(value) => {
                        if !dedup || !bound.contains(&value) {
                            bound.push(value);
                        }
                    }
                    Err(err) => errors.push(
                        FieldError::new(
                            index(&location, i),
                            BindingErrorKind::TypeMismatch,
                            err.to_string(),
                        )
                        .with_text_input(raw),
                    ),
                }
            }
            if errors.len() > before {
                return None;
            }
            let value = Value::Array(bound);
            let violations = constraints::evaluate(&value, &spec.constraints);
            if violations.is_empty() {
                Some(value)
            } else {
                errors.push(constraint_failure(&location, &violations, &value));
                None
            }
        }
        _ => {
            // Repeated keys for a scalar parameter: last occurrence wins.
            let raw = values[values.len() - 1];
            bind_text(spec, &location, raw, errors)
        }
    }
}

fn bind_text(
    spec: &ParameterSpec,
    location: &str,
    raw: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let coerced = match coerce::coerce_text(raw, &spec.ty) {
        Ok(value) => value,
        Err(err) => {
            errors.push(
                FieldError::new(location, BindingErrorKind::TypeMismatch, err.to_string())
                    .with_text_input(raw),
            );
            return None;
        }
    };
    let violations = constraints::evaluate(&coerced, &spec.constraints);
    if violations.is_empty() {
        Some(coerced)
    } else {
        errors.push(constraint_failure(
            location,
            &violations,
            &Value::String(raw.to_string()),
        ));
        None
    }
}
