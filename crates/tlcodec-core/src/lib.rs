#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Schema IR for TL codec generation.
//!
//! Two layers:
//! - **Loading layer**: JSON form of a parsed schema, names instead of ids
//! - **Analysis layer**: ID-indexed [`Schema`] read by the compiler and runtime
//!
//! Builtin primitives occupy the first six TypeIds, so every schema can
//! reference `#`, `int`, `long`, `double`, `string` and `bytes` directly.

mod colors;
mod json;
pub mod magic;
mod primitive;
mod schema;

pub use colors::Colors;
pub use json::SchemaError;
pub use primitive::Primitive;
pub use schema::{
    Arg, Combinator, FieldMask, Function, FunctionId, ParamKind, Schema, TypeDef, TypeExpr,
    TypeId, TypeParam, namespace_of,
};

#[cfg(test)]
mod json_tests;
#[cfg(test)]
mod magic_tests;
