//! Typed extraction: turn a successful binding into a plain request struct.
//!
//! The bound parameter set is already one JSON object keyed by parameter
//! name, so any `DeserializeOwned` struct whose field names match the
//! declared parameters deserializes straight out of it.

use crate::binder::BoundParams;
use anyhow::Result;
use serde::de::DeserializeOwned;

/// Conversion from a bound parameter set into a typed request value.
///
/// A blanket impl covers every `DeserializeOwned` type; implement manually
/// only when field names and parameter names diverge.
pub trait FromBoundParams: Sized {
    fn from_bound(params: BoundParams) -> Result<Self>;
}

impl<T: DeserializeOwned> FromBoundParams for T {
    fn from_bound(params: BoundParams) -> Result<T> {
        Ok(serde_json::from_value(params.into_value())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{ParamType, ParameterSpec, RouteSpec};
    use crate::{RawRequest, RequestBindingContext};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct ReadItem {
        item_id: i64,
        q: Option<String>,
        short: bool,
    }

    #[test]
    fn test_bound_params_deserialize_into_struct() {
        let mut ctx = RequestBindingContext::new();
        let handle = ctx
            .register_route(
                RouteSpec::new("/items/{item_id}")
                    .parameter(ParameterSpec::path("item_id", ParamType::Integer))
                    .parameter(ParameterSpec::query("q", ParamType::String))
                    .parameter(
                        ParameterSpec::query("short", ParamType::Boolean)
                            .default_value(serde_json::json!(false)),
                    ),
            )
            .unwrap();

        let req = RawRequest::from_url("/items/42?q=hello");
        let params = ctx.bind(handle, &req).unwrap();
        let typed = ReadItem::from_bound(params).unwrap();
        assert_eq!(typed.item_id, 42);
        assert_eq!(typed.q.as_deref(), Some("hello"));
        assert!(!typed.short);
    }
}
