//! Route registration and per-request binding orchestration.
//!
//! A `RequestBindingContext` is built once at startup: named models are
//! registered first, then routes, each yielding an opaque [`RouteHandle`].
//! Registration resolves every type reference, compiles path templates and
//! patterns, and pre-validates defaults, so the per-request `bind` call only
//! reads frozen spec trees and never fails for configuration reasons.

use crate::error::{child, BindingErrorKind, BindingErrors, FieldError};
use crate::spec::{
    build, FieldSpec, ObjectSpec, ParamSource, ParamType, ParameterSpec, RouteSpec, SpecError,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::{object, param};

/// Opaque handle returned by route registration and used to invoke binding.
///
/// Handles are only meaningful on the context that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteHandle(pub(crate) usize);

/// How a route's body parameters consume the body payload. Fixed at
/// registration from explicit spec metadata, never inferred per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyPlan {
    /// No body parameters; the payload is ignored.
    Ignore,
    /// Exactly one non-embedded body parameter consumes the whole payload.
    Direct,
    /// The payload must be a JSON object carrying one key per body
    /// parameter (single embedded parameter, or several parameters).
    Keyed,
}

#[derive(Debug, Clone)]
struct RoutePlan {
    template: build::PathTemplate,
    path_params: Vec<Arc<ParameterSpec>>,
    query_params: Vec<Arc<ParameterSpec>>,
    body_params: Vec<Arc<ParameterSpec>>,
    body_plan: BodyPlan,
}

/// Owns the registered spec trees for every route and performs binding.
///
/// Registration happens once at startup, strictly before concurrent binding
/// calls begin; `bind` is a pure read of the frozen plans plus the caller's
/// request data, so concurrent calls need no coordination.
#[derive(Debug, Default)]
pub struct RequestBindingContext {
    objects: HashMap<String, Arc<ObjectSpec>>,
    routes: Vec<RoutePlan>,
}

impl RequestBindingContext {
    #[must_use]
    pub fn new() -> Self {
        RequestBindingContext::default()
    }

    /// Register a named model for later reference by type name.
    ///
    /// References inside the model are resolved against models registered
    /// earlier, so definitions must arrive in dependency order.
    pub fn register_object(&mut self, spec: ObjectSpec) -> Result<(), SpecError> {
        build::validate_identifier(&spec.type_name)?;
        if self.objects.contains_key(&spec.type_name) {
            return Err(SpecError::DuplicateObject {
                name: spec.type_name.clone(),
            });
        }
        let resolved = self.resolve_object(&spec)?;
        let ty = ParamType::Object(Arc::clone(&resolved));
        build::validate_type(&spec.type_name, &ty)?;
        info!(
            object = %spec.type_name,
            fields = resolved.fields.len(),
            strict = resolved.strict,
            "Object spec registered"
        );
        self.objects.insert(spec.type_name.clone(), resolved);
        Ok(())
    }

    /// Registered model by name, if any.
    #[must_use]
    pub fn object(&self, type_name: &str) -> Option<&Arc<ObjectSpec>> {
        self.objects.get(type_name)
    }

    /// Register one route's parameters and return the handle used to bind
    /// requests against it.
    ///
    /// Every spec inconsistency (conflicting bounds, bad pattern, unknown
    /// type reference, template/parameter mismatch, invalid default) is
    /// surfaced here, deliberately preventing startup with a broken spec.
    pub fn register_route(&mut self, route: RouteSpec) -> Result<RouteHandle, SpecError> {
        let template = build::compile_path_pattern(&route.path_pattern)?;

        let mut path_params = Vec::new();
        let mut query_params = Vec::new();
        let mut body_params = Vec::new();

        for (i, declared) in route.parameters.iter().enumerate() {
            if route.parameters[..i].iter().any(|p| p.name == declared.name) {
                return Err(SpecError::DuplicateParameter {
                    name: declared.name.clone(),
                });
            }
            let mut spec = declared.clone();
            spec.ty = self.resolve_type(&spec.name, &spec.ty)?;
            build::validate_parameter(&spec)?;
            let spec = Arc::new(spec);
            match spec.source {
                ParamSource::Path => path_params.push(spec),
                ParamSource::Query => query_params.push(spec),
                ParamSource::Body => body_params.push(spec),
            }
        }

        for slot in &template.params {
            if !path_params.iter().any(|p| p.name == slot.name) {
                return Err(SpecError::PathTemplate {
                    pattern: route.path_pattern.clone(),
                    detail: format!("template parameter `{}` has no declared spec", slot.name),
                });
            }
        }
        for spec in &path_params {
            if !template.params.iter().any(|s| s.name == spec.name) {
                return Err(SpecError::PathTemplate {
                    pattern: route.path_pattern.clone(),
                    detail: format!(
                        "declared path parameter `{}` does not appear in the template",
                        spec.name
                    ),
                });
            }
        }

        let body_plan = match body_params.as_slice() {
            [] => BodyPlan::Ignore,
            [single] if !single.embed => BodyPlan::Direct,
            _ => BodyPlan::Keyed,
        };

        let handle = RouteHandle(self.routes.len());
        info!(
            pattern = %route.path_pattern,
            path_params = path_params.len(),
            query_params = query_params.len(),
            body_params = body_params.len(),
            body_plan = ?body_plan,
            "Route registered"
        );
        self.routes.push(RoutePlan {
            template,
            path_params,
            query_params,
            body_params,
            body_plan,
        });
        Ok(handle)
    }

    /// Bind one request against a registered route.
    ///
    /// All-or-nothing: either every declared parameter bound, or the full
    /// list of field errors across all three sources. Binding never panics
    /// for ordinary invalid input.
    pub fn bind(
        &self,
        handle: RouteHandle,
        request: &crate::request::RawRequest,
    ) -> Result<BoundParams, BindingErrors> {
        let plan = match self.routes.get(handle.0) {
            Some(plan) => plan,
            None => {
                // A handle from a different context; not a request fault,
                // but bind must stay panic-free.
                return Err(BindingErrors::new(vec![FieldError::new(
                    "path",
                    BindingErrorKind::MalformedBody,
                    "route handle does not belong to this binding context",
                )]));
            }
        };

        let mut errors: Vec<FieldError> = Vec::new();
        let mut bound = Map::new();

        match plan.template.regex.captures(request.path()) {
            Some(captures) => {
                for spec in &plan.path_params {
                    let raw = captures.name(&spec.name).map(|m| m.as_str());
                    if let Some(value) = param::bind_path_param(spec, raw, &mut errors) {
                        bound.insert(spec.name.clone(), value);
                    }
                }
            }
            None => {
                // Individual path parameters are unknowable without a
                // template match; report once and move on to the other
                // sources so error reporting stays exhaustive.
                errors.push(
                    FieldError::new(
                        "path",
                        BindingErrorKind::TypeMismatch,
                        format!(
                            "path `{}` does not match template `{}`",
                            request.path(),
                            plan.template.pattern
                        ),
                    )
                    .with_text_input(request.path()),
                );
            }
        }

        for spec in &plan.query_params {
            let values = request.query_values(spec.lookup_key());
            if let Some(value) = param::bind_query_param(spec, &values, &mut errors) {
                bound.insert(spec.name.clone(), value);
            }
        }

        self.bind_body(plan, request.body(), &mut bound, &mut errors);

        debug!(
            path = %request.path(),
            bound = bound.len(),
            errors = errors.len(),
            "Binding attempt finished"
        );

        if errors.is_empty() {
            Ok(BoundParams { values: bound })
        } else {
            Err(BindingErrors::new(errors))
        }
    }

    fn bind_body(
        &self,
        plan: &RoutePlan,
        body: Option<&Value>,
        bound: &mut Map<String, Value>,
        errors: &mut Vec<FieldError>,
    ) {
        // JSON null is the same as no payload.
        let body = body.filter(|v| !v.is_null());
        match plan.body_plan {
            BodyPlan::Ignore => {}
            BodyPlan::Direct => {
                // Registration guarantees exactly one body parameter here.
                if let Some(spec) = plan.body_params.first() {
                    match body {
                        Some(value) => {
                            if let Some(v) = bind_body_param(spec, value, errors) {
                                bound.insert(spec.name.clone(), v);
                            }
                        }
                        None => apply_absent_body(spec, bound, errors),
                    }
                }
            }
            BodyPlan::Keyed => match body {
                Some(Value::Object(input)) => {
                    for spec in &plan.body_params {
                        match input.get(spec.lookup_key()).filter(|v| !v.is_null()) {
                            Some(value) => {
                                if let Some(v) = bind_body_param(spec, value, errors) {
                                    bound.insert(spec.name.clone(), v);
                                }
                            }
                            None => apply_absent_body(spec, bound, errors),
                        }
                    }
                }
                Some(other) => {
                    errors.push(
                        FieldError::new(
                            "body",
                            BindingErrorKind::MalformedBody,
                            format!(
                                "expected a JSON object with one key per body parameter ({}), got {}",
                                plan.body_params
                                    .iter()
                                    .map(|p| p.lookup_key().to_string())
                                    .collect::<Vec<_>>()
                                    .join(", "),
                                crate::coerce::json_type_name(other)
                            ),
                        )
                        .with_input(other),
                    );
                }
                None => {
                    for spec in &plan.body_params {
                        apply_absent_body(spec, bound, errors);
                    }
                }
            },
        }
    }

    fn resolve_object(&self, spec: &ObjectSpec) -> Result<Arc<ObjectSpec>, SpecError> {
        let mut fields = Vec::with_capacity(spec.fields.len());
        let mut changed = false;
        for field in &spec.fields {
            let owner = format!("{}.{}", spec.type_name, field.name);
            let ty = self.resolve_type(&owner, &field.ty)?;
            if !same_shape(&ty, &field.ty) {
                changed = true;
            }
            fields.push(FieldSpec {
                name: field.name.clone(),
                ty,
                required: field.required,
                default: field.default.clone(),
                constraints: field.constraints.clone(),
            });
        }
        if changed {
            let mut resolved = ObjectSpec::new(spec.type_name.clone(), fields);
            resolved.strict = spec.strict;
            Ok(Arc::new(resolved))
        } else {
            Ok(Arc::new(spec.clone()))
        }
    }

    /// Substitute every `Ref` in a type tree with the registered model it
    /// names. Runs only at registration.
    fn resolve_type(&self, owner: &str, ty: &ParamType) -> Result<ParamType, SpecError> {
        match ty {
            ParamType::Ref(name) => match self.objects.get(name) {
                Some(obj) => Ok(ParamType::Object(Arc::clone(obj))),
                None => Err(SpecError::UnknownTypeRef {
                    name: owner.to_string(),
                    reference: name.clone(),
                }),
            },
            ParamType::Object(obj) => Ok(ParamType::Object(self.resolve_object(obj)?)),
            ParamType::List(elem) => Ok(ParamType::List(Box::new(
                self.resolve_type(owner, elem)?,
            ))),
            ParamType::Set(elem) => Ok(ParamType::Set(Box::new(
                self.resolve_type(owner, elem)?,
            ))),
            ParamType::Map { key, value } => Ok(ParamType::Map {
                key: key.clone(),
                value: Box::new(self.resolve_type(owner, value)?),
            }),
            other => Ok(other.clone()),
        }
    }
}

/// True when no `Ref` substitution happened anywhere in the tree.
fn same_shape(resolved: &ParamType, original: &ParamType) -> bool {
    match (resolved, original) {
        (ParamType::Object(_), ParamType::Ref(_)) => false,
        (ParamType::Object(a), ParamType::Object(b)) => Arc::ptr_eq(a, b),
        (ParamType::List(a), ParamType::List(b)) | (ParamType::Set(a), ParamType::Set(b)) => {
            same_shape(a, b)
        }
        (ParamType::Map { value: a, .. }, ParamType::Map { value: b, .. }) => same_shape(a, b),
        _ => true,
    }
}

fn bind_body_param(
    spec: &ParameterSpec,
    raw: &Value,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let location = child("body", &spec.name);
    let value = object::bind_value(&location, &spec.ty, raw, errors)?;
    let violations = crate::constraints::evaluate(&value, &spec.constraints);
    if violations.is_empty() {
        Some(value)
    } else {
        errors.push(super::constraint_failure(&location, &violations, raw));
        None
    }
}

fn apply_absent_body(
    spec: &ParameterSpec,
    bound: &mut Map<String, Value>,
    errors: &mut Vec<FieldError>,
) {
    if let Some(default) = &spec.default {
        bound.insert(spec.name.clone(), default.clone());
    } else if spec.required {
        errors.push(FieldError::new(
            child("body", &spec.name),
            BindingErrorKind::MissingRequired,
            format!("required body parameter `{}` is missing", spec.lookup_key()),
        ));
    }
}

/// The fully bound parameter set of one successful binding call, keyed by
/// declared parameter name. Optional parameters that were absent with no
/// default are simply not present.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct BoundParams {
    values: Map<String, Value>,
}

impl BoundParams {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(Value::as_i64)
    }

    #[must_use]
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(Value::as_f64)
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(Value::as_bool)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume the bound set as one JSON object, e.g. for typed
    /// deserialization into a handler's request struct.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}
