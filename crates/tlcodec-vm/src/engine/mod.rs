//! Codec engine: plan interpretation over a wire cursor.
//!
//! Encoding and decoding share the frame model: each constructor invocation
//! owns a slot vector for captured naturals plus its parameter bindings, and
//! generic arguments travel as closures over the instantiating frame.

mod coerce;
mod codec;
mod decode;
mod encode;
mod error;
mod frame;
mod registry;
mod value;

#[cfg(test)]
mod forward_tests;
#[cfg(test)]
mod test_utils;

pub use codec::{Engine, EngineBuilder, Limits, Typing};
pub use error::CodecError;
pub use registry::{FunctionRegistry, FunctionTable};
pub use value::{CONSTRUCTOR_FIELD, Value};
