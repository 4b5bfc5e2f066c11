pub(crate) mod build;
mod load;
mod types;

pub use build::SpecError;
pub use load::{load_binding_spec, parse_binding_spec, LoadedBindingSpec};
pub use types::{
    CollectionKind, ConstraintSet, EnumSpec, FieldSpec, NumericBound, ObjectSpec, ParamSource,
    ParamType, ParameterSpec, RouteSpec,
};
