#![allow(dead_code)]

use parambind::spec::{ConstraintSet, FieldSpec, ObjectSpec, ParamType};
use std::sync::Once;

static INIT: Once = Once::new();

/// Install a test subscriber once so `RUST_LOG=debug cargo test` shows
/// binding events.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// The item model used across body-binding tests: a required name, a
/// positive price, optional description and tags.
pub fn item_object() -> ObjectSpec {
    ObjectSpec::new(
        "Item",
        vec![
            FieldSpec::new("name", ParamType::String).required(),
            FieldSpec::new("description", ParamType::String)
                .constraints(ConstraintSet::new().max_length(300)),
            FieldSpec::new("price", ParamType::Float)
                .required()
                .constraints(ConstraintSet::new().gt(0.0)),
            FieldSpec::new("tax", ParamType::Float),
            FieldSpec::new("tags", ParamType::List(Box::new(ParamType::String)))
                .default_value(serde_json::json!([])),
        ],
    )
}

/// A user model with one required and one optional field.
pub fn user_object() -> ObjectSpec {
    ObjectSpec::new(
        "User",
        vec![
            FieldSpec::new("username", ParamType::String).required(),
            FieldSpec::new("full_name", ParamType::String),
        ],
    )
}
