mod common;

use common::item_object;
use parambind::spec::{
    ConstraintSet, EnumSpec, FieldSpec, ObjectSpec, ParamType, ParameterSpec, RouteSpec, SpecError,
};
use parambind::RequestBindingContext;
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_invalid_pattern_is_rejected_at_build_time() {
    let err = ConstraintSet::new().pattern("[unclosed").unwrap_err();
    assert!(matches!(err, SpecError::InvalidPattern { .. }));
}

#[test]
fn test_empty_numeric_range_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    let err = ctx
        .register_route(
            RouteSpec::new("/items").parameter(
                ParameterSpec::query("size", ParamType::Float)
                    .constraints(ConstraintSet::new().gt(10.0).lt(10.0)),
            ),
        )
        .unwrap_err();
    assert!(matches!(err, SpecError::ConflictingBounds { .. }));
}

#[test]
fn test_min_length_above_max_length_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    let err = ctx
        .register_route(
            RouteSpec::new("/items").parameter(
                ParameterSpec::query("q", ParamType::String)
                    .constraints(ConstraintSet::new().min_length(5).max_length(3)),
            ),
        )
        .unwrap_err();
    assert!(matches!(err, SpecError::ConflictingBounds { .. }));
}

#[test]
fn test_empty_enum_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    let pet = ParamType::Enum(Arc::new(EnumSpec::new("Pet", Vec::<String>::new())));
    let err = ctx
        .register_route(RouteSpec::new("/pets/{pet}").parameter(ParameterSpec::path("pet", pet)))
        .unwrap_err();
    assert!(matches!(err, SpecError::EmptyEnum { .. }));
}

#[test]
fn test_duplicate_enum_variant_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    let pet = ParamType::Enum(Arc::new(EnumSpec::new("Pet", ["dog", "cat", "dog"])));
    let err = ctx
        .register_route(RouteSpec::new("/pets/{pet}").parameter(ParameterSpec::path("pet", pet)))
        .unwrap_err();
    assert!(matches!(err, SpecError::DuplicateVariant { .. }));
}

#[test]
fn test_duplicate_parameter_name_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    let err = ctx
        .register_route(
            RouteSpec::new("/items")
                .parameter(ParameterSpec::query("q", ParamType::String))
                .parameter(ParameterSpec::query("q", ParamType::Integer)),
        )
        .unwrap_err();
    assert!(matches!(err, SpecError::DuplicateParameter { .. }));
}

#[test]
fn test_optional_path_parameter_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    let mut spec = ParameterSpec::path("id", ParamType::Integer);
    spec.required = false;
    let err = ctx
        .register_route(RouteSpec::new("/items/{id}").parameter(spec))
        .unwrap_err();
    assert!(matches!(err, SpecError::OptionalPathParameter { .. }));
}

#[test]
fn test_path_parameter_with_default_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    let err = ctx
        .register_route(
            RouteSpec::new("/items/{id}")
                .parameter(ParameterSpec::path("id", ParamType::Integer).default_value(json!(1))),
        )
        .unwrap_err();
    assert!(matches!(err, SpecError::OptionalPathParameter { .. }));
}

#[test]
fn test_object_typed_path_parameter_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    ctx.register_object(item_object()).unwrap();
    let err = ctx
        .register_route(
            RouteSpec::new("/items/{item}")
                .parameter(ParameterSpec::path("item", ParamType::Ref("Item".into()))),
        )
        .unwrap_err();
    assert!(matches!(err, SpecError::UnsupportedSourceType { .. }));
}

#[test]
fn test_object_typed_query_parameter_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    ctx.register_object(item_object()).unwrap();
    let err = ctx
        .register_route(
            RouteSpec::new("/items")
                .parameter(ParameterSpec::query("item", ParamType::Ref("Item".into()))),
        )
        .unwrap_err();
    assert!(matches!(err, SpecError::UnsupportedSourceType { .. }));
}

#[test]
fn test_query_list_of_scalars_is_accepted() {
    let mut ctx = RequestBindingContext::new();
    assert!(ctx
        .register_route(
            RouteSpec::new("/items").parameter(ParameterSpec::query(
                "ids",
                ParamType::List(Box::new(ParamType::Integer)),
            )),
        )
        .is_ok());
}

#[test]
fn test_embed_on_query_parameter_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    let err = ctx
        .register_route(
            RouteSpec::new("/items")
                .parameter(ParameterSpec::query("q", ParamType::String).embed()),
        )
        .unwrap_err();
    assert!(matches!(err, SpecError::EmbedOutsideBody { .. }));
}

#[test]
fn test_unknown_type_reference_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    let err = ctx
        .register_route(
            RouteSpec::new("/items")
                .parameter(ParameterSpec::body("item", ParamType::Ref("Missing".into()))),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        SpecError::UnknownTypeRef { ref reference, .. } if reference == "Missing"
    ));
}

#[test]
fn test_duplicate_object_registration_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    ctx.register_object(item_object()).unwrap();
    let err = ctx.register_object(item_object()).unwrap_err();
    assert!(matches!(err, SpecError::DuplicateObject { .. }));
}

#[test]
fn test_default_violating_own_constraints_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    let err = ctx
        .register_route(
            RouteSpec::new("/items").parameter(
                ParameterSpec::query("limit", ParamType::Integer)
                    .constraints(ConstraintSet::new().ge(1.0))
                    .default_value(json!(0)),
            ),
        )
        .unwrap_err();
    assert!(matches!(err, SpecError::InvalidDefault { .. }));
}

#[test]
fn test_default_of_wrong_type_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    let err = ctx
        .register_route(
            RouteSpec::new("/items").parameter(
                ParameterSpec::query("limit", ParamType::Integer).default_value(json!("ten")),
            ),
        )
        .unwrap_err();
    assert!(matches!(err, SpecError::InvalidDefault { .. }));
}

#[test]
fn test_invalid_field_default_in_object_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    let spec = ObjectSpec::new(
        "Bad",
        vec![FieldSpec::new("count", ParamType::Integer)
            .constraints(ConstraintSet::new().ge(0.0))
            .default_value(json!(-1))],
    );
    let err = ctx.register_object(spec).unwrap_err();
    assert!(matches!(err, SpecError::InvalidDefault { .. }));
}

#[test]
fn test_template_parameter_without_spec_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    let err = ctx
        .register_route(RouteSpec::new("/items/{item_id}"))
        .unwrap_err();
    assert!(matches!(err, SpecError::PathTemplate { .. }));
}

#[test]
fn test_declared_path_parameter_missing_from_template_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    let err = ctx
        .register_route(
            RouteSpec::new("/items").parameter(ParameterSpec::path("id", ParamType::Integer)),
        )
        .unwrap_err();
    assert!(matches!(err, SpecError::PathTemplate { .. }));
}

#[test]
fn test_remainder_parameter_must_be_last_segment() {
    let mut ctx = RequestBindingContext::new();
    let err = ctx
        .register_route(
            RouteSpec::new("/files/{file_path:path}/meta")
                .parameter(ParameterSpec::path("file_path", ParamType::String)),
        )
        .unwrap_err();
    assert!(matches!(err, SpecError::PathTemplate { .. }));
}

#[test]
fn test_partial_segment_parameter_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    let err = ctx
        .register_route(
            RouteSpec::new("/items/v{id}")
                .parameter(ParameterSpec::path("id", ParamType::Integer)),
        )
        .unwrap_err();
    assert!(matches!(err, SpecError::PathTemplate { .. }));
}

#[test]
fn test_invalid_parameter_name_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    let err = ctx
        .register_route(
            RouteSpec::new("/items")
                .parameter(ParameterSpec::query("9lives", ParamType::String)),
        )
        .unwrap_err();
    assert!(matches!(err, SpecError::InvalidName { .. }));
}

#[test]
fn test_empty_allowed_values_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    let err = ctx
        .register_route(
            RouteSpec::new("/items").parameter(
                ParameterSpec::query("q", ParamType::String)
                    .constraints(ConstraintSet::new().allowed_values(Vec::new())),
            ),
        )
        .unwrap_err();
    assert!(matches!(err, SpecError::ConflictingBounds { .. }));
}

#[test]
fn test_map_with_object_key_is_rejected() {
    let mut ctx = RequestBindingContext::new();
    ctx.register_object(item_object()).unwrap();
    let err = ctx
        .register_route(
            RouteSpec::new("/weights").parameter(ParameterSpec::body(
                "weights",
                ParamType::Map {
                    key: Box::new(ParamType::Ref("Item".into())),
                    value: Box::new(ParamType::Float),
                },
            )),
        )
        .unwrap_err();
    assert!(matches!(err, SpecError::UnsupportedSourceType { .. }));
}

#[test]
fn test_spec_error_messages_name_the_offender() {
    let err = SpecError::UnknownTypeRef {
        name: "offer.items".to_string(),
        reference: "Itm".to_string(),
    };
    let rendered = err.to_string();
    assert!(rendered.contains("offer.items"));
    assert!(rendered.contains("Itm"));
}
