//! Runtime for compiled TL codec plans.
//!
//! The engine walks a [`tlcodec_compiler::Program`] to turn [`Value`]s into
//! wire bytes and back, for types, function calls and function results.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod engine;

pub use engine::{
    CONSTRUCTOR_FIELD, CodecError, Engine, EngineBuilder, FunctionRegistry, FunctionTable, Limits,
    Typing, Value,
};
