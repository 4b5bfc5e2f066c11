//! Loading binding specs from declarative YAML/JSON documents.
//!
//! A binding spec document declares named object models and routes with
//! their parameters and constraints; loading it builds a fully registered
//! [`RequestBindingContext`] in one pass at startup. Models are declared as
//! an ordered sequence so references resolve in dependency order.
//!
//! ```yaml
//! objects:
//!   - name: Item
//!     fields:
//!       - { name: name, type: string, required: true }
//!       - { name: price, type: float, required: true, gt: 0 }
//!       - { name: tags, type: list, items: string, default: [] }
//! routes:
//!   - name: update_item
//!     path: /items/{item_id}
//!     parameters:
//!       - { name: item_id, in: path, type: integer, ge: 1 }
//!       - { name: q, in: query, type: string, max_length: 50 }
//!       - { name: item, in: body, type: Item, required: true, embed: true }
//! ```

use super::build::SpecError;
use super::types::{
    ConstraintSet, EnumSpec, FieldSpec, ObjectSpec, ParamType, ParameterSpec, RouteSpec,
};
use crate::binder::{RequestBindingContext, RouteHandle};
use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    objects: Vec<RawObject>,
    #[serde(default)]
    routes: Vec<RawRoute>,
}

#[derive(Debug, Deserialize)]
struct RawObject {
    name: String,
    #[serde(default)]
    strict: bool,
    #[serde(default)]
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    ty: Option<String>,
    #[serde(rename = "enum")]
    enum_variants: Option<Vec<String>>,
    /// Element type for `list`/`set`.
    items: Option<String>,
    /// Key/value types for `map`.
    keys: Option<String>,
    values: Option<String>,
    #[serde(default)]
    required: bool,
    default: Option<Value>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<String>,
    ge: Option<f64>,
    gt: Option<f64>,
    le: Option<f64>,
    lt: Option<f64>,
    allowed: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawRoute {
    name: String,
    path: String,
    #[serde(default)]
    parameters: Vec<RawParameter>,
}

#[derive(Debug, Deserialize)]
struct RawParameter {
    #[serde(rename = "in")]
    location: String,
    alias: Option<String>,
    #[serde(default)]
    embed: bool,
    #[serde(flatten)]
    field: RawField,
}

/// A binding spec document loaded into a registered context, with route
/// handles addressable by route name.
#[derive(Debug)]
pub struct LoadedBindingSpec {
    pub context: RequestBindingContext,
    routes: HashMap<String, RouteHandle>,
}

impl LoadedBindingSpec {
    /// Handle for a named route.
    pub fn route(&self, name: &str) -> Result<RouteHandle, SpecError> {
        self.routes
            .get(name)
            .copied()
            .ok_or_else(|| SpecError::UnknownRoute {
                name: name.to_string(),
            })
    }

    #[must_use]
    pub fn route_names(&self) -> Vec<&str> {
        self.routes.keys().map(String::as_str).collect()
    }
}

/// Load a binding spec document from disk. `.yaml`/`.yml` files parse as
/// YAML, everything else as JSON.
pub fn load_binding_spec(path: impl AsRef<Path>) -> anyhow::Result<LoadedBindingSpec> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read binding spec {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    let document: RawDocument = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", path.display()))?
    };
    register_document(document)
}

/// Parse a binding spec document from a YAML string (JSON documents parse
/// too, YAML being a superset).
pub fn parse_binding_spec(content: &str) -> anyhow::Result<LoadedBindingSpec> {
    let document: RawDocument =
        serde_yaml::from_str(content).context("invalid binding spec document")?;
    register_document(document)
}

fn register_document(document: RawDocument) -> anyhow::Result<LoadedBindingSpec> {
    let mut context = RequestBindingContext::new();

    for object in &document.objects {
        let spec = build_object(object)?;
        context
            .register_object(spec)
            .with_context(|| format!("registering object `{}`", object.name))?;
    }

    let mut routes = HashMap::new();
    for route in &document.routes {
        if routes.contains_key(&route.name) {
            return Err(SpecError::DuplicateRoute {
                name: route.name.clone(),
            }
            .into());
        }
        let mut spec = RouteSpec::new(route.path.clone());
        for raw in &route.parameters {
            spec = spec.parameter(build_parameter(raw)?);
        }
        let handle = context
            .register_route(spec)
            .with_context(|| format!("registering route `{}`", route.name))?;
        routes.insert(route.name.clone(), handle);
    }

    info!(
        objects = document.objects.len(),
        routes = routes.len(),
        "Binding spec document loaded"
    );
    Ok(LoadedBindingSpec { context, routes })
}

fn build_object(raw: &RawObject) -> anyhow::Result<ObjectSpec> {
    let mut fields = Vec::with_capacity(raw.fields.len());
    for field in &raw.fields {
        fields.push(build_field(field)?);
    }
    let mut spec = ObjectSpec::new(raw.name.clone(), fields);
    if raw.strict {
        spec = spec.strict();
    }
    Ok(spec)
}

fn build_field(raw: &RawField) -> anyhow::Result<FieldSpec> {
    let mut field = FieldSpec::new(raw.name.clone(), build_type(raw)?)
        .constraints(build_constraints(raw)?);
    if raw.required {
        field = field.required();
    }
    if let Some(default) = &raw.default {
        field = field.default_value(default.clone());
    }
    Ok(field)
}

fn build_parameter(raw: &RawParameter) -> anyhow::Result<ParameterSpec> {
    let ty = build_type(&raw.field)?;
    let mut spec = match raw.location.as_str() {
        "path" => ParameterSpec::path(raw.field.name.clone(), ty),
        "query" => ParameterSpec::query(raw.field.name.clone(), ty),
        "body" => ParameterSpec::body(raw.field.name.clone(), ty),
        other => anyhow::bail!(
            "parameter `{}`: unknown source `{other}` (expected path, query, or body)",
            raw.field.name
        ),
    };
    spec = spec.constraints(build_constraints(&raw.field)?);
    if raw.field.required {
        spec = spec.required();
    }
    if let Some(default) = &raw.field.default {
        spec = spec.default_value(default.clone());
    }
    if let Some(alias) = &raw.alias {
        spec = spec.alias(alias.clone());
    }
    if raw.embed {
        spec = spec.embed();
    }
    Ok(spec)
}

fn scalar_or_ref(name: &str) -> ParamType {
    match name {
        "string" => ParamType::String,
        "integer" | "int" => ParamType::Integer,
        "float" | "number" => ParamType::Float,
        "boolean" | "bool" => ParamType::Boolean,
        other => ParamType::Ref(other.to_string()),
    }
}

fn build_type(raw: &RawField) -> anyhow::Result<ParamType> {
    if let Some(variants) = &raw.enum_variants {
        return Ok(ParamType::Enum(Arc::new(EnumSpec::new(
            raw.name.clone(),
            variants.iter().cloned(),
        ))));
    }
    let name = raw.ty.as_deref().unwrap_or("string");
    let ty = match name {
        "list" | "set" => {
            let elem = scalar_or_ref(raw.items.as_deref().unwrap_or("string"));
            if name == "list" {
                ParamType::List(Box::new(elem))
            } else {
                ParamType::Set(Box::new(elem))
            }
        }
        "map" => ParamType::Map {
            key: Box::new(scalar_or_ref(raw.keys.as_deref().unwrap_or("string"))),
            value: Box::new(scalar_or_ref(raw.values.as_deref().unwrap_or("string"))),
        },
        other => scalar_or_ref(other),
    };
    Ok(ty)
}

fn build_constraints(raw: &RawField) -> anyhow::Result<ConstraintSet> {
    let owner = raw.name.as_str();
    if raw.ge.is_some() && raw.gt.is_some() {
        return Err(SpecError::ConflictingBounds {
            name: owner.to_string(),
            detail: "both ge and gt are declared".to_string(),
        }
        .into());
    }
    if raw.le.is_some() && raw.lt.is_some() {
        return Err(SpecError::ConflictingBounds {
            name: owner.to_string(),
            detail: "both le and lt are declared".to_string(),
        }
        .into());
    }

    let mut cs = ConstraintSet::new();
    if let Some(n) = raw.min_length {
        cs = cs.min_length(n);
    }
    if let Some(n) = raw.max_length {
        cs = cs.max_length(n);
    }
    if let Some(pat) = &raw.pattern {
        cs = cs.pattern(pat)?;
    }
    if let Some(limit) = raw.ge {
        cs = cs.ge(limit);
    }
    if let Some(limit) = raw.gt {
        cs = cs.gt(limit);
    }
    if let Some(limit) = raw.le {
        cs = cs.le(limit);
    }
    if let Some(limit) = raw.lt {
        cs = cs.lt(limit);
    }
    if let Some(allowed) = &raw.allowed {
        cs = cs.allowed_values(allowed.iter().cloned());
    }
    Ok(cs)
}
