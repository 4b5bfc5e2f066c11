use super::types::{ConstraintSet, ParamSource, ParamType, ParameterSpec};
use once_cell::sync::Lazy;
use regex::Regex;

static IDENT_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("identifier regex is valid")
});

/// Registration-time specification error.
///
/// These are fatal at startup by design: a route with an inconsistent spec
/// must never be registered, so none of these can surface at request time.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecError {
    InvalidPattern {
        pattern: String,
        detail: String,
    },
    ConflictingBounds {
        name: String,
        detail: String,
    },
    EmptyEnum {
        name: String,
    },
    DuplicateVariant {
        name: String,
        variant: String,
    },
    InvalidName {
        name: String,
    },
    DuplicateParameter {
        name: String,
    },
    DuplicateObject {
        name: String,
    },
    UnknownTypeRef {
        name: String,
        reference: String,
    },
    InvalidDefault {
        name: String,
        detail: String,
    },
    UnsupportedSourceType {
        name: String,
        source: ParamSource,
        ty: String,
    },
    EmbedOutsideBody {
        name: String,
    },
    OptionalPathParameter {
        name: String,
    },
    PathTemplate {
        pattern: String,
        detail: String,
    },
    UnknownRoute {
        name: String,
    },
    DuplicateRoute {
        name: String,
    },
}

impl std::fmt::Display for SpecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecError::InvalidPattern { pattern, detail } => {
                write!(f, "invalid constraint pattern `{pattern}`: {detail}")
            }
            SpecError::ConflictingBounds { name, detail } => {
                write!(f, "conflicting bounds on `{name}`: {detail}")
            }
            SpecError::EmptyEnum { name } => {
                write!(f, "enum `{name}` declares no variants")
            }
            SpecError::DuplicateVariant { name, variant } => {
                write!(f, "enum `{name}` declares variant `{variant}` more than once")
            }
            SpecError::InvalidName { name } => {
                write!(f, "`{name}` is not a valid parameter or field name")
            }
            SpecError::DuplicateParameter { name } => {
                write!(f, "parameter `{name}` is declared more than once")
            }
            SpecError::DuplicateObject { name } => {
                write!(f, "object `{name}` is registered more than once")
            }
            SpecError::UnknownTypeRef { name, reference } => {
                write!(f, "`{name}` references unregistered object `{reference}`")
            }
            SpecError::InvalidDefault { name, detail } => {
                write!(f, "default value for `{name}` fails its own spec: {detail}")
            }
            SpecError::UnsupportedSourceType { name, source, ty } => {
                write!(f, "`{name}`: {ty} cannot be bound from the {source} source")
            }
            SpecError::EmbedOutsideBody { name } => {
                write!(f, "`{name}`: embed mode is only valid for body parameters")
            }
            SpecError::OptionalPathParameter { name } => {
                write!(f, "path parameter `{name}` cannot be optional or carry a default")
            }
            SpecError::PathTemplate { pattern, detail } => {
                write!(f, "invalid path template `{pattern}`: {detail}")
            }
            SpecError::UnknownRoute { name } => {
                write!(f, "no route named `{name}` in the binding spec document")
            }
            SpecError::DuplicateRoute { name } => {
                write!(f, "route `{name}` is declared more than once")
            }
        }
    }
}

impl std::error::Error for SpecError {}

pub(crate) fn validate_identifier(name: &str) -> Result<(), SpecError> {
    if IDENT_RE.is_match(name) {
        Ok(())
    } else {
        Err(SpecError::InvalidName {
            name: name.to_string(),
        })
    }
}

/// Check the internal consistency of a constraint set.
///
/// Runs once per declared parameter/field at registration; request-time
/// evaluation assumes these invariants hold.
pub(crate) fn validate_constraints(owner: &str, cs: &ConstraintSet) -> Result<(), SpecError> {
    if let (Some(min), Some(max)) = (cs.min_length, cs.max_length) {
        if min > max {
            return Err(SpecError::ConflictingBounds {
                name: owner.to_string(),
                detail: format!("min_length {min} exceeds max_length {max}"),
            });
        }
    }
    if let (Some(lo), Some(hi)) = (cs.min_value, cs.max_value) {
        let empty = lo.limit > hi.limit
            || (lo.limit == hi.limit && (lo.exclusive || hi.exclusive));
        if empty {
            return Err(SpecError::ConflictingBounds {
                name: owner.to_string(),
                detail: format!(
                    "lower bound {}{} and upper bound {}{} leave no valid values",
                    if lo.exclusive { ">" } else { ">=" },
                    lo.limit,
                    if hi.exclusive { "<" } else { "<=" },
                    hi.limit,
                ),
            });
        }
    }
    if let Some(allowed) = &cs.allowed_values {
        if allowed.is_empty() {
            return Err(SpecError::ConflictingBounds {
                name: owner.to_string(),
                detail: "allowed_values is empty".to_string(),
            });
        }
    }
    Ok(())
}

/// Validate a type tree: enum variant sets, nested field specs, and their
/// defaults. `Ref`s are expected to be resolved before this runs.
pub(crate) fn validate_type(owner: &str, ty: &ParamType) -> Result<(), SpecError> {
    match ty {
        ParamType::String | ParamType::Integer | ParamType::Float | ParamType::Boolean => Ok(()),
        ParamType::Enum(e) => {
            if e.variants.is_empty() {
                return Err(SpecError::EmptyEnum {
                    name: e.name.clone(),
                });
            }
            for (i, v) in e.variants.iter().enumerate() {
                if e.variants[..i].contains(v) {
                    return Err(SpecError::DuplicateVariant {
                        name: e.name.clone(),
                        variant: v.clone(),
                    });
                }
            }
            Ok(())
        }
        ParamType::Object(obj) => {
            for (i, field) in obj.fields.iter().enumerate() {
                if obj.fields[..i].iter().any(|f| f.name == field.name) {
                    return Err(SpecError::DuplicateParameter {
                        name: format!("{}.{}", obj.type_name, field.name),
                    });
                }
                let fowner = format!("{owner}.{}", field.name);
                validate_identifier(&field.name)?;
                validate_constraints(&fowner, &field.constraints)?;
                validate_type(&fowner, &field.ty)?;
                if let Some(default) = &field.default {
                    validate_default(&fowner, &field.ty, &field.constraints, default)?;
                }
            }
            Ok(())
        }
        ParamType::List(elem) | ParamType::Set(elem) => validate_type(owner, elem),
        ParamType::Map { key, value } => {
            if !key.is_textual_scalar() {
                return Err(SpecError::UnsupportedSourceType {
                    name: owner.to_string(),
                    source: ParamSource::Body,
                    ty: format!("map keyed by {}", key.describe()),
                });
            }
            validate_type(owner, value)
        }
        ParamType::Ref(reference) => Err(SpecError::UnknownTypeRef {
            name: owner.to_string(),
            reference: reference.clone(),
        }),
    }
}

/// Pre-validate a declared default against its own type and constraints.
///
/// Defaults are returned verbatim at request time with coercion and
/// constraint checks skipped, so they must be proven valid here.
pub(crate) fn validate_default(
    owner: &str,
    ty: &ParamType,
    constraints: &ConstraintSet,
    default: &serde_json::Value,
) -> Result<(), SpecError> {
    let mut errors = Vec::new();
    let bound = crate::binder::object::bind_value(owner, ty, default, &mut errors);
    if let Some(err) = errors.first() {
        return Err(SpecError::InvalidDefault {
            name: owner.to_string(),
            detail: err.message.clone(),
        });
    }
    if let Some(value) = bound {
        let violations = crate::constraints::evaluate(&value, constraints);
        if let Some(v) = violations.first() {
            return Err(SpecError::InvalidDefault {
                name: owner.to_string(),
                detail: v.to_string(),
            });
        }
    }
    Ok(())
}

/// Full registration-time validation of one declared parameter.
pub(crate) fn validate_parameter(param: &ParameterSpec) -> Result<(), SpecError> {
    validate_identifier(&param.name)?;
    if let Some(alias) = &param.alias {
        validate_identifier(alias)?;
    }
    if param.embed && param.source != ParamSource::Body {
        return Err(SpecError::EmbedOutsideBody {
            name: param.name.clone(),
        });
    }
    match param.source {
        ParamSource::Path => {
            if !param.required || param.default.is_some() {
                return Err(SpecError::OptionalPathParameter {
                    name: param.name.clone(),
                });
            }
            if !param.ty.is_textual_scalar() {
                return Err(SpecError::UnsupportedSourceType {
                    name: param.name.clone(),
                    source: param.source,
                    ty: param.ty.describe(),
                });
            }
        }
        ParamSource::Query => {
            let ok = match &param.ty {
                t if t.is_textual_scalar() => true,
                ParamType::List(elem) | ParamType::Set(elem) => elem.is_textual_scalar(),
                _ => false,
            };
            if !ok {
                return Err(SpecError::UnsupportedSourceType {
                    name: param.name.clone(),
                    source: param.source,
                    ty: param.ty.describe(),
                });
            }
        }
        ParamSource::Body => {}
    }
    validate_constraints(&param.name, &param.constraints)?;
    validate_type(&param.name, &param.ty)?;
    if let Some(default) = &param.default {
        validate_default(&param.name, &param.ty, &param.constraints, default)?;
    }
    Ok(())
}

/// One named capture slot in a compiled path template.
#[derive(Debug, Clone)]
pub(crate) struct PathParamSlot {
    pub name: String,
    /// `{name:path}` remainder slot: matches across `/` separators.
    pub remainder: bool,
}

/// A path template compiled to an anchored regex with one named capture per
/// declared parameter.
#[derive(Debug, Clone)]
pub(crate) struct PathTemplate {
    pub pattern: String,
    pub regex: Regex,
    pub params: Vec<PathParamSlot>,
}

/// Convert a path template to a regex and extract its parameter slots.
///
/// `/users/{id}` becomes `^/users/(?P<id>[^/]+)$`; a trailing
/// `{file:path}` slot becomes `(?P<file>.+)` so it consumes the rest of the
/// path, embedded separators included.
pub(crate) fn compile_path_pattern(pattern: &str) -> Result<PathTemplate, SpecError> {
    let template_err = |detail: &str| SpecError::PathTemplate {
        pattern: pattern.to_string(),
        detail: detail.to_string(),
    };

    if !pattern.starts_with('/') {
        return Err(template_err("template must start with `/`"));
    }

    let mut regex_str = String::with_capacity(pattern.len() + 16);
    regex_str.push('^');
    let mut params: Vec<PathParamSlot> = Vec::new();

    let segments: Vec<&str> = pattern[1..].split('/').collect();
    let last = segments.len().saturating_sub(1);
    for (i, segment) in segments.iter().enumerate() {
        regex_str.push('/');
        if let Some(inner) = segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
        {
            let (name, remainder) = match inner.strip_suffix(":path") {
                Some(name) => (name, true),
                None => (inner, false),
            };
            validate_identifier(name)
                .map_err(|_| template_err(&format!("invalid parameter name `{name}`")))?;
            if params.iter().any(|p| p.name == name) {
                return Err(template_err(&format!("duplicate parameter `{name}`")));
            }
            if remainder && i != last {
                return Err(template_err(&format!(
                    "remainder parameter `{name}` must be the final segment"
                )));
            }
            if remainder {
                regex_str.push_str(&format!("(?P<{name}>.+)"));
            } else {
                regex_str.push_str(&format!("(?P<{name}>[^/]+)"));
            }
            params.push(PathParamSlot {
                name: name.to_string(),
                remainder,
            });
        } else if segment.contains('{') || segment.contains('}') {
            return Err(template_err(
                "a parameter must span an entire path segment",
            ));
        } else {
            regex_str.push_str(&regex::escape(segment));
        }
    }
    regex_str.push('$');

    let regex = Regex::new(&regex_str).map_err(|e| template_err(&e.to_string()))?;
    Ok(PathTemplate {
        pattern: pattern.to_string(),
        regex,
        params,
    })
}
