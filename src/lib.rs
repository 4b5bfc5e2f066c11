//! # parambind
//!
//! **parambind** is a declarative request parameter binding and validation
//! layer: it binds untyped incoming string/JSON data (path segments, query
//! strings, decoded JSON bodies) to typed, constrained parameters and
//! produces structured, itemized validation errors.
//!
//! ## Overview
//!
//! Routes declare their parameters once at startup — source, type,
//! presence rule, constraints — either programmatically through builders or
//! from a YAML/JSON binding spec document. Registration freezes the spec
//! trees, compiles path templates and constraint patterns, and rejects any
//! inconsistent spec outright. At request time, binding is a pure,
//! synchronous read of those frozen trees: every declared parameter is
//! coerced and validated, and every failure across all three sources is
//! collected into one field-addressable error report.
//!
//! ## Architecture
//!
//! - **[`spec`]** - parameter/object/constraint spec types, builders,
//!   registration-time validation, and the spec document loader
//! - **[`coerce`]** - type coercion from raw text and decoded JSON
//! - **[`constraints`]** - constraint evaluation over coerced values
//! - **[`binder`]** - per-parameter and per-object binding plus the
//!   [`RequestBindingContext`] orchestrator
//! - **[`request`]** - the raw request triple handed over by the host layer
//! - **[`error`]** - located field errors and the aggregated error report
//! - **[`typed`]** - deserializing a successful binding into request structs
//!
//! ### Binding Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host as Host layer
//!     participant Ctx as RequestBindingContext
//!     participant Param as ParameterBinder
//!     participant Obj as ObjectBinder
//!
//!     Host->>Ctx: bind(handle, RawRequest)
//!     Ctx->>Ctx: match path template
//!     Ctx->>Param: bind each path/query parameter
//!     Param->>Param: coerce, then evaluate constraints
//!     Ctx->>Obj: bind body per registered body plan
//!     Obj->>Obj: walk fields, recurse into nested specs
//!     Obj-->>Ctx: located field errors (aggregated)
//!     Ctx-->>Host: BoundParams or BindingErrors
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use parambind::spec::{ParamType, ParameterSpec, RouteSpec};
//! use parambind::{RawRequest, RequestBindingContext};
//!
//! let mut ctx = RequestBindingContext::new();
//! let route = ctx.register_route(
//!     RouteSpec::new("/pets/{id}")
//!         .parameter(ParameterSpec::path("id", ParamType::Integer))
//!         .parameter(ParameterSpec::query("limit", ParamType::Integer)),
//! )?;
//!
//! let request = RawRequest::from_url("/pets/42?limit=10");
//! let params = ctx.bind(route, &request).expect("valid request");
//! assert_eq!(params.get_i64("id"), Some(42));
//! assert_eq!(params.get_i64("limit"), Some(10));
//! # Ok::<(), parambind::spec::SpecError>(())
//! ```
//!
//! ## Error Reporting
//!
//! Binding is all-or-nothing per request, but error reporting is
//! exhaustive, not fail-fast: an object with three invalid fields yields
//! exactly three errors, each carrying a dotted/indexed location path such
//! as `body.item.tags[2]` plus the stringified offending input. Spec
//! inconsistencies (conflicting bounds, invalid patterns, unresolved model
//! references) are a separate, fatal class raised at registration time so
//! a service never starts with a broken spec.

pub mod binder;
pub mod coerce;
pub mod constraints;
pub mod error;
pub mod request;
pub mod spec;
pub mod typed;

pub use binder::{BoundParams, RequestBindingContext, RouteHandle};
pub use error::{BindingErrorKind, BindingErrors, FieldError};
pub use request::{parse_query_params, RawRequest};
pub use spec::{load_binding_spec, parse_binding_spec, LoadedBindingSpec, SpecError};
