//! Structural binding of decoded JSON against object and collection specs.
//!
//! The walk is compositional recursion over the spec tree: objects iterate
//! their declared fields in order, collections iterate their elements, and
//! every scalar leaf defers to the type coercer. All failures across the
//! whole tree are aggregated into one flat list of located errors; the walk
//! never stops at the first nested failure.

use crate::coerce;
use crate::constraints;
use crate::error::{child, index, BindingErrorKind, FieldError};
use crate::spec::{ObjectSpec, ParamType};
use serde_json::{Map, Value};

use super::constraint_failure;

/// Bind one JSON value against a type descriptor, pushing every failure into
/// `errors` with locations rooted at `location`.
///
/// Returns the bound value only when this subtree bound cleanly.
pub(crate) fn bind_value(
    location: &str,
    ty: &ParamType,
    raw: &Value,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    match ty {
        ParamType::Object(spec) => bind_object(location, spec, raw, errors),
        ParamType::List(elem) => bind_sequence(location, elem, raw, errors, false),
        ParamType::Set(elem) => bind_sequence(location, elem, raw, errors, true),
        ParamType::Map { key, value } => bind_map(location, key, value, raw, errors),
        ParamType::Ref(name) => {
            // Unresolved references cannot survive registration; treat one
            // slipping through as a plain mismatch rather than panicking.
            errors.push(
                FieldError::new(
                    location,
                    BindingErrorKind::TypeMismatch,
                    format!("unresolved object reference `{name}`"),
                )
                .with_input(raw),
            );
            None
        }
        leaf => match coerce::coerce_scalar_json(raw, leaf) {
            Ok(value) => Some(value),
            Err(err) => {
                errors.push(
                    FieldError::new(location, BindingErrorKind::TypeMismatch, err.to_string())
                        .with_input(raw),
                );
                None
            }
        },
    }
}

/// Bind a JSON value against an object spec, aggregating every field error.
pub(crate) fn bind_object(
    location: &str,
    spec: &ObjectSpec,
    raw: &Value,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let input = match raw.as_object() {
        Some(obj) => obj,
        None => {
            errors.push(
                FieldError::new(
                    location,
                    BindingErrorKind::TypeMismatch,
                    format!(
                        "expected object `{}`, got {}",
                        spec.type_name,
                        coerce::json_type_name(raw)
                    ),
                )
                .with_input(raw),
            );
            return None;
        }
    };

    let before = errors.len();
    let mut bound = Map::new();

    for field in &spec.fields {
        let field_location = child(location, &field.name);
        match input.get(&field.name) {
            // JSON null is treated the same as an absent key: it either
            // falls back to the default or trips the required check.
            None | Some(Value::Null) => {
                if let Some(default) = &field.default {
                    bound.insert(field.name.clone(), default.clone());
                } else if field.required {
                    errors.push(FieldError::new(
                        field_location,
                        BindingErrorKind::MissingRequired,
                        format!("required field `{}` is missing", field.name),
                    ));
                }
            }
            Some(value) => {
                if let Some(coerced) = bind_value(&field_location, &field.ty, value, errors) {
                    let violations = constraints::evaluate(&coerced, &field.constraints);
                    if violations.is_empty() {
                        bound.insert(field.name.clone(), coerced);
                    } else {
                        errors.push(constraint_failure(&field_location, &violations, value));
                    }
                }
            }
        }
    }

    if spec.strict {
        for key in input.keys() {
            if spec.field(key).is_none() {
                errors.push(FieldError::new(
                    child(location, key),
                    BindingErrorKind::MalformedBody,
                    format!("unknown field `{key}` (object `{}` is strict)", spec.type_name),
                ));
            }
        }
    }

    if errors.len() > before {
        None
    } else {
        Some(Value::Object(bound))
    }
}

fn bind_sequence(
    location: &str,
    elem: &ParamType,
    raw: &Value,
    errors: &mut Vec<FieldError>,
    dedup: bool,
) -> Option<Value> {
    let items = match raw.as_array() {
        Some(items) => items,
        None => {
            errors.push(
                FieldError::new(
                    location,
                    BindingErrorKind::TypeMismatch,
                    format!(
                        "expected {} of {}, got {}",
                        if dedup { "set" } else { "list" },
                        elem.describe(),
                        coerce::json_type_name(raw)
                    ),
                )
                .with_input(raw),
            );
            return None;
        }
    };

    let before = errors.len();
    let mut bound = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if let Some(value) = bind_value(&index(location, i), elem, item, errors) {
            // Sets keep the first occurrence and drop duplicates silently.
            if !dedup || !bound.contains(&value) {
                bound.push(value);
            }
        }
    }

    if errors.len() > before {
        None
    } else {
        Some(Value::Array(bound))
    }
}

fn bind_map(
    location: &str,
    key_ty: &ParamType,
    value_ty: &ParamType,
    raw: &Value,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let input = match raw.as_object() {
        Some(obj) => obj,
        None => {
            errors.push(
                FieldError::new(
                    location,
                    BindingErrorKind::TypeMismatch,
                    format!(
                        "expected map of {} to {}, got {}",
                        key_ty.describe(),
                        value_ty.describe(),
                        coerce::json_type_name(raw)
                    ),
                )
                .with_input(raw),
            );
            return None;
        }
    };

    let before = errors.len();
    let mut bound = Map::new();
    for (key, value) in input {
        let entry_location = child(location, key);
        // JSON keys arrive as strings regardless of the declared key type;
        // the key coercer validates them, the output keeps the original text.
        if let Err(err) = coerce::coerce_text(key, key_ty) {
            errors.push(
                FieldError::new(
                    entry_location.clone(),
                    BindingErrorKind::TypeMismatch,
                    format!("map key: {err}"),
                )
                .with_text_input(key),
            );
            continue;
        }
        if let Some(v) = bind_value(&entry_location, value_ty, value, errors) {
            bound.insert(key.clone(), v);
        }
    }

    if errors.len() > before {
        None
    } else {
        Some(Value::Object(bound))
    }
}
