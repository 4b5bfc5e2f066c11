use serde::Serialize;
use serde_json::Value;

/// Classification of one request-time binding failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingErrorKind {
    /// A required parameter or field with no default was absent.
    MissingRequired,
    /// The raw value could not be coerced to the declared type.
    TypeMismatch,
    /// The coerced value violated one or more declared constraints.
    ConstraintViolation,
    /// The body payload did not have the shape the route's body plan requires.
    MalformedBody,
}

impl std::fmt::Display for BindingErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingErrorKind::MissingRequired => write!(f, "missing_required"),
            BindingErrorKind::TypeMismatch => write!(f, "type_mismatch"),
            BindingErrorKind::ConstraintViolation => write!(f, "constraint_violation"),
            BindingErrorKind::MalformedBody => write!(f, "malformed_body"),
        }
    }
}

/// One located, itemized validation failure.
///
/// `location` is a dotted/indexed path rooted at the parameter source, e.g.
/// `body.item.tags[2]` or `query.q`, so a client can map the error back to
/// the offending input field without guessing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub location: String,
    pub kind: BindingErrorKind,
    pub message: String,
    /// Stringified original input, when there was one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_input: Option<String>,
    /// For `ConstraintViolation`: every violated rule, rendered one per entry.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub violations: Vec<String>,
}

impl FieldError {
    pub fn new(
        location: impl Into<String>,
        kind: BindingErrorKind,
        message: impl Into<String>,
    ) -> Self {
        FieldError {
            location: location.into(),
            kind,
            message: message.into(),
            invalid_input: None,
            violations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_input(mut self, raw: &Value) -> Self {
        self.invalid_input = Some(stringify_input(raw));
        self
    }

    #[must_use]
    pub fn with_text_input(mut self, raw: &str) -> Self {
        self.invalid_input = Some(raw.to_string());
        self
    }

    #[must_use]
    pub fn with_violations(mut self, violations: Vec<String>) -> Self {
        self.violations = violations;
        self
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location, self.message)
    }
}

/// Aggregated result of a failed binding attempt: every field-level failure
/// across all three sources, in declaration order. Serializes directly as an
/// error response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingErrors {
    pub errors: Vec<FieldError>,
}

impl BindingErrors {
    #[must_use]
    pub fn new(errors: Vec<FieldError>) -> Self {
        BindingErrors { errors }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// First error at the given location, if any.
    #[must_use]
    pub fn at(&self, location: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.location == location)
    }
}

impl std::fmt::Display for BindingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "binding failed with {} error(s)", self.errors.len())?;
        for e in &self.errors {
            write!(f, "\n  {e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BindingErrors {}

/// Render the offending raw input for error reports. Strings are kept bare
/// (no JSON quoting) since that is what the client sent on the wire.
pub(crate) fn stringify_input(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Append `key` to a dotted location path.
pub(crate) fn child(location: &str, key: &str) -> String {
    format!("{location}.{key}")
}

/// Append `[index]` to a location path.
pub(crate) fn index(location: &str, i: usize) -> String {
    format!("{location}[{i}]")
}
