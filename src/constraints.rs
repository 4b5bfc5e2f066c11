//! Constraint evaluation over already-coerced values.
//!
//! Checks run in a deterministic order (length, numeric bounds, pattern,
//! membership) and never short-circuit: a single field can surface every
//! violation it commits in one pass.

use crate::error::stringify_input;
use crate::spec::ConstraintSet;
use serde_json::Value;
use smallvec::SmallVec;

/// One violated constraint rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    TooShort { min: usize, actual: usize },
    TooLong { max: usize, actual: usize },
    TooSmall { limit: f64, exclusive: bool, actual: f64 },
    TooLarge { limit: f64, exclusive: bool, actual: f64 },
    PatternMismatch { pattern: String },
    NotAllowed { allowed: Vec<String> },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::TooShort { min, actual } => {
                write!(f, "length {actual} is less than minimum {min}")
            }
            Violation::TooLong { max, actual } => {
                write!(f, "length {actual} exceeds maximum {max}")
            }
            Violation::TooSmall {
                limit,
                exclusive,
                actual,
            } => {
                if *exclusive {
                    write!(f, "{actual} is not greater than {limit}")
                } else {
                    write!(f, "{actual} is less than minimum {limit}")
                }
            }
            Violation::TooLarge {
                limit,
                exclusive,
                actual,
            } => {
                if *exclusive {
                    write!(f, "{actual} is not less than {limit}")
                } else {
                    write!(f, "{actual} exceeds maximum {limit}")
                }
            }
            Violation::PatternMismatch { pattern } => {
                write!(f, "value does not match pattern `{pattern}`")
            }
            Violation::NotAllowed { allowed } => {
                write!(f, "value is not one of [{}]", allowed.join(", "))
            }
        }
    }
}

/// Most fields violate zero or one rule; two inline slots cover the common
/// worst case without touching the heap.
pub type Violations = SmallVec<[Violation; 2]>;

/// Evaluate every applicable constraint against an already-coerced value.
///
/// Returns the full list of violated rules (empty list = pass). Checks that
/// do not apply to the value's type are skipped, not failed: coercion has
/// already pinned the type down.
#[must_use]
pub fn evaluate(value: &Value, constraints: &ConstraintSet) -> Violations {
    let mut violations = Violations::new();
    if constraints.is_empty() {
        return violations;
    }

    let length = match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(a) => Some(a.len()),
        _ => None,
    };
    if let (Some(min), Some(actual)) = (constraints.min_length, length) {
        if actual < min {
            violations.push(Violation::TooShort { min, actual });
        }
    }
    if let (Some(max), Some(actual)) = (constraints.max_length, length) {
        if actual > max {
            violations.push(Violation::TooLong { max, actual });
        }
    }

    if let Some(actual) = value.as_f64() {
        if let Some(lo) = constraints.min_value {
            let ok = if lo.exclusive {
                actual > lo.limit
            } else {
                actual >= lo.limit
            };
            if !ok {
                violations.push(Violation::TooSmall {
                    limit: lo.limit,
                    exclusive: lo.exclusive,
                    actual,
                });
            }
        }
        if let Some(hi) = constraints.max_value {
            let ok = if hi.exclusive {
                actual < hi.limit
            } else {
                actual <= hi.limit
            };
            if !ok {
                violations.push(Violation::TooLarge {
                    limit: hi.limit,
                    exclusive: hi.exclusive,
                    actual,
                });
            }
        }
    }

    if let (Some(pattern), Value::String(s)) = (&constraints.pattern, value) {
        if !pattern.is_match(s) {
            violations.push(Violation::PatternMismatch {
                pattern: pattern.as_str().to_string(),
            });
        }
    }

    if let Some(allowed) = &constraints.allowed_values {
        if !allowed.iter().any(|a| a == value) {
            violations.push(Violation::NotAllowed {
                allowed: allowed.iter().map(stringify_input).collect(),
            });
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_set_passes_everything() {
        let cs = ConstraintSet::new();
        assert!(evaluate(&json!("anything"), &cs).is_empty());
        assert!(evaluate(&json!(-42), &cs).is_empty());
    }

    #[test]
    fn test_all_checks_run_without_short_circuit() {
        let cs = ConstraintSet::new()
            .min_length(10)
            .pattern(r"^\d+$")
            .unwrap();
        let violations = evaluate(&json!("abc"), &cs);
        assert_eq!(violations.len(), 2);
        assert!(matches!(violations[0], Violation::TooShort { min: 10, actual: 3 }));
        assert!(matches!(violations[1], Violation::PatternMismatch { .. }));
    }

    #[test]
    fn test_exclusive_bound_rejects_limit() {
        let cs = ConstraintSet::new().gt(0.0);
        assert_eq!(evaluate(&json!(0), &cs).len(), 1);
        assert!(evaluate(&json!(0.01), &cs).is_empty());
    }

    #[test]
    fn test_length_applies_to_arrays() {
        let cs = ConstraintSet::new().max_length(2);
        let violations = evaluate(&json!(["a", "b", "c"]), &cs);
        assert_eq!(violations.len(), 1);
        assert!(matches!(violations[0], Violation::TooLong { max: 2, actual: 3 }));
    }

    #[test]
    fn test_membership_compares_typed_values() {
        let cs = ConstraintSet::new().allowed_values([json!(1), json!(2)]);
        assert!(evaluate(&json!(2), &cs).is_empty());
        let violations = evaluate(&json!(3), &cs);
        assert!(matches!(violations[0], Violation::NotAllowed { .. }));
    }
}
