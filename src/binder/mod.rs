//! Parameter binding: per-parameter, per-object, and per-request.
//!
//! `param` binds single text-sourced parameters, `object` walks structured
//! body values, and `context` owns the registered route plans and
//! orchestrates one binding call across all three sources.

pub(crate) mod object;
pub(crate) mod param;

mod context;

pub use context::{BoundParams, RequestBindingContext, RouteHandle};

use crate::constraints::Violation;
use crate::error::{BindingErrorKind, FieldError};
use serde_json::Value;

/// Fold a non-empty violation list into one `ConstraintViolation` error for
/// the field: a field violating two constraints yields a single error
/// listing both, not two separate errors.
pub(crate) fn constraint_failure(
    location: &str,
    violations: &[Violation],
    raw: &Value,
) -> FieldError {
    let rendered: Vec<String> = violations.iter().map(ToString::to_string).collect();
    FieldError::new(
        location,
        BindingErrorKind::ConstraintViolation,
        rendered.join("; "),
    )
    .with_input(raw)
    .with_violations(rendered)
}
