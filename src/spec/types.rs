use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

/// Where a declared parameter is taken from in the incoming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    Path,
    Query,
    Body,
}

impl std::fmt::Display for ParamSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamSource::Path => write!(f, "path"),
            ParamSource::Query => write!(f, "query"),
            ParamSource::Body => write!(f, "body"),
        }
    }
}

/// Shape of a collection-typed parameter or field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    List,
    Set,
    Map,
}

/// A closed set of valid string variants for an enum-constrained parameter.
///
/// Coercion is an exact-match lookup against `variants`; anything else is a
/// type mismatch, not an open string comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSpec {
    pub name: String,
    pub variants: Vec<String>,
}

impl EnumSpec {
    pub fn new(
        name: impl Into<String>,
        variants: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        EnumSpec {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.variants.iter().any(|v| v == value)
    }
}

/// Declared type of a parameter or model field.
///
/// `Ref` names a registered model and is resolved into `Object` at
/// registration time; it never survives into a route plan.
#[derive(Debug, Clone)]
pub enum ParamType {
    String,
    Integer,
    Float,
    Boolean,
    Enum(Arc<EnumSpec>),
    Object(Arc<ObjectSpec>),
    List(Box<ParamType>),
    Set(Box<ParamType>),
    Map {
        key: Box<ParamType>,
        value: Box<ParamType>,
    },
    Ref(String),
}

impl ParamType {
    /// Human-readable type name used in `TypeMismatch` messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            ParamType::String => "string".to_string(),
            ParamType::Integer => "integer".to_string(),
            ParamType::Float => "number".to_string(),
            ParamType::Boolean => "boolean".to_string(),
            ParamType::Enum(e) => format!("one of [{}]", e.variants.join(", ")),
            ParamType::Object(o) => format!("object `{}`", o.type_name),
            ParamType::List(elem) => format!("list of {}", elem.describe()),
            ParamType::Set(elem) => format!("set of {}", elem.describe()),
            ParamType::Map { key, value } => {
                format!("map of {} to {}", key.describe(), value.describe())
            }
            ParamType::Ref(name) => format!("object `{}`", name),
        }
    }

    /// True for types that can be coerced from a single text token
    /// (path segments, query values).
    #[must_use]
    pub fn is_textual_scalar(&self) -> bool {
        matches!(
            self,
            ParamType::String
                | ParamType::Integer
                | ParamType::Float
                | ParamType::Boolean
                | ParamType::Enum(_)
        )
    }
}

/// One side of a numeric range constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericBound {
    pub limit: f64,
    /// `gt`/`lt` when true, `ge`/`le` when false.
    pub exclusive: bool,
}

impl NumericBound {
    #[must_use]
    pub fn inclusive(limit: f64) -> Self {
        NumericBound {
            limit,
            exclusive: false,
        }
    }

    #[must_use]
    pub fn exclusive(limit: f64) -> Self {
        NumericBound {
            limit,
            exclusive: true,
        }
    }
}

/// Immutable bag of validation rules attached to one declared parameter.
///
/// Any subset may be absent (unconstrained). The consistency invariants
/// (min ≤ max, non-empty numeric range, compilable pattern) are enforced at
/// registration time by the spec builder, never per request.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub min_value: Option<NumericBound>,
    pub max_value: Option<NumericBound>,
    pub allowed_values: Option<Vec<Value>>,
}

impl ConstraintSet {
    #[must_use]
    pub fn new() -> Self {
        ConstraintSet::default()
    }

    #[must_use]
    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    #[must_use]
    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    /// Compile `pat` as the pattern constraint. An invalid pattern is a
    /// registration-time spec error.
    pub fn pattern(mut self, pat: &str) -> Result<Self, super::SpecError> {
        let regex = Regex::new(pat).map_err(|source| super::SpecError::InvalidPattern {
            pattern: pat.to_string(),
            detail: source.to_string(),
        })?;
        self.pattern = Some(regex);
        Ok(self)
    }

    /// Inclusive lower bound (`ge`).
    #[must_use]
    pub fn ge(mut self, limit: f64) -> Self {
        self.min_value = Some(NumericBound::inclusive(limit));
        self
    }

    /// Exclusive lower bound (`gt`).
    #[must_use]
    pub fn gt(mut self, limit: f64) -> Self {
        self.min_value = Some(NumericBound::exclusive(limit));
        self
    }

    /// Inclusive upper bound (`le`).
    #[must_use]
    pub fn le(mut self, limit: f64) -> Self {
        self.max_value = Some(NumericBound::inclusive(limit));
        self
    }

    /// Exclusive upper bound (`lt`).
    #[must_use]
    pub fn lt(mut self, limit: f64) -> Self {
        self.max_value = Some(NumericBound::exclusive(limit));
        self
    }

    #[must_use]
    pub fn allowed_values(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.allowed_values = Some(values.into_iter().collect());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
            && self.min_value.is_none()
            && self.max_value.is_none()
            && self.allowed_values.is_none()
    }
}

/// One typed field of an [`ObjectSpec`].
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub ty: ParamType,
    pub required: bool,
    pub default: Option<Value>,
    pub constraints: ConstraintSet,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        FieldSpec {
            name: name.into(),
            ty,
            required: false,
            default: None,
            constraints: ConstraintSet::default(),
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub fn constraints(mut self, constraints: ConstraintSet) -> Self {
        self.constraints = constraints;
        self
    }
}

/// A named model: an ordered sequence of typed fields, supporting arbitrary
/// nesting depth and self-composition (object containing object containing
/// list of object).
#[derive(Debug, Clone)]
pub struct ObjectSpec {
    pub type_name: String,
    pub fields: Vec<FieldSpec>,
    /// Reject unknown input keys instead of ignoring them.
    pub strict: bool,
}

impl ObjectSpec {
    pub fn new(type_name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        ObjectSpec {
            type_name: type_name.into(),
            fields,
            strict: false,
        }
    }

    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Immutable, registration-time description of one declared parameter:
/// its name, source, type, presence rule, and constraints.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: String,
    pub source: ParamSource,
    pub ty: ParamType,
    pub required: bool,
    pub default: Option<Value>,
    pub constraints: ConstraintSet,
    /// Alternate key to look up in the query string (e.g. `item-query`).
    pub alias: Option<String>,
    /// Body parameters only: bind under a synthetic top-level key equal to
    /// the parameter name instead of consuming the whole body.
    pub embed: bool,
}

impl ParameterSpec {
    fn new(name: impl Into<String>, source: ParamSource, ty: ParamType) -> Self {
        ParameterSpec {
            name: name.into(),
            source,
            ty,
            required: source == ParamSource::Path,
            default: None,
            constraints: ConstraintSet::default(),
            alias: None,
            embed: false,
        }
    }

    /// Declare a path parameter. Path parameters are always required.
    pub fn path(name: impl Into<String>, ty: ParamType) -> Self {
        ParameterSpec::new(name, ParamSource::Path, ty)
    }

    /// Declare a query parameter (optional by default).
    pub fn query(name: impl Into<String>, ty: ParamType) -> Self {
        ParameterSpec::new(name, ParamSource::Query, ty)
    }

    /// Declare a body parameter (optional by default).
    pub fn body(name: impl Into<String>, ty: ParamType) -> Self {
        ParameterSpec::new(name, ParamSource::Body, ty)
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub fn constraints(mut self, constraints: ConstraintSet) -> Self {
        self.constraints = constraints;
        self
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn embed(mut self) -> Self {
        self.embed = true;
        self
    }

    /// Key to look up in the raw request: the alias when declared, otherwise
    /// the parameter name.
    #[must_use]
    pub fn lookup_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Everything a route declares for binding: its path template and the
/// ordered list of parameters across all three sources.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    /// Path template, e.g. `/users/{user_id}/files/{path:path}`. A `:path`
    /// modifier makes the parameter consume the remainder of the path,
    /// embedded separators included.
    pub path_pattern: String,
    pub parameters: Vec<ParameterSpec>,
}

impl RouteSpec {
    pub fn new(path_pattern: impl Into<String>) -> Self {
        RouteSpec {
            path_pattern: path_pattern.into(),
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }
}
